//! Assessment-item document generator.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::ConvertError;
use crate::models::{Choice, QuestionRecord};
use crate::qti::{document_writer, element, into_document, text_element, write, QTI_NS};

/// Standard match-correct response processing referenced by every item.
const RESPONSE_PROCESSING_TEMPLATE: &str =
    "http://www.imsglobal.org/question/qti_v2p1/rptemplates/match_correct";

/// Emit a self-contained assessment-item document for one question.
///
/// The prompt markup is embedded verbatim, not escaped: it is authored HTML
/// and escaping it would render the tags as literal text in delivery engines.
/// Everything else, attribute values included, goes through the writer's
/// escaping.
pub fn build_assessment_item(
    record: &QuestionRecord,
    shuffle: bool,
    max_choices: u32,
) -> Result<String, ConvertError> {
    let mut writer = document_writer()?;

    let points = record.points.to_string();
    let max_choices = max_choices.to_string();

    write(
        &mut writer,
        Event::Start(element(
            "assessmentItem",
            &[
                ("xmlns", QTI_NS),
                ("identifier", &record.identifier),
                ("title", &record.title),
                ("adaptive", "false"),
                ("timeDependent", "false"),
            ],
        )),
    )?;

    write(
        &mut writer,
        Event::Start(element(
            "responseDeclaration",
            &[
                ("identifier", "RESPONSE"),
                ("cardinality", "single"),
                ("baseType", "identifier"),
            ],
        )),
    )?;
    write(&mut writer, Event::Start(BytesStart::new("correctResponse")))?;
    text_element(&mut writer, "value", record.correct_choice.as_str())?;
    write(&mut writer, Event::End(BytesEnd::new("correctResponse")))?;
    write(&mut writer, Event::End(BytesEnd::new("responseDeclaration")))?;

    write(
        &mut writer,
        Event::Start(element(
            "outcomeDeclaration",
            &[
                ("identifier", "SCORE"),
                ("cardinality", "single"),
                ("baseType", "float"),
            ],
        )),
    )?;
    write(&mut writer, Event::Start(BytesStart::new("defaultValue")))?;
    text_element(&mut writer, "value", &points)?;
    write(&mut writer, Event::End(BytesEnd::new("defaultValue")))?;
    write(&mut writer, Event::End(BytesEnd::new("outcomeDeclaration")))?;

    write(&mut writer, Event::Start(BytesStart::new("itemBody")))?;
    write(
        &mut writer,
        Event::Start(element(
            "choiceInteraction",
            &[
                ("responseIdentifier", "RESPONSE"),
                ("shuffle", if shuffle { "true" } else { "false" }),
                ("maxChoices", &max_choices),
            ],
        )),
    )?;

    write(&mut writer, Event::Start(BytesStart::new("prompt")))?;
    write(
        &mut writer,
        Event::Text(BytesText::from_escaped(record.prompt_html.as_str())),
    )?;
    write(&mut writer, Event::End(BytesEnd::new("prompt")))?;

    for label in Choice::LABELS {
        write(
            &mut writer,
            Event::Start(element("simpleChoice", &[("identifier", label.as_str())])),
        )?;
        write(&mut writer, Event::Text(BytesText::new(label.as_str())))?;
        write(&mut writer, Event::End(BytesEnd::new("simpleChoice")))?;
    }

    write(&mut writer, Event::End(BytesEnd::new("choiceInteraction")))?;
    write(&mut writer, Event::End(BytesEnd::new("itemBody")))?;

    write(
        &mut writer,
        Event::Empty(element(
            "responseProcessing",
            &[("template", RESPONSE_PROCESSING_TEMPLATE)],
        )),
    )?;

    write(&mut writer, Event::End(BytesEnd::new("assessmentItem")))?;
    into_document(writer)
}
