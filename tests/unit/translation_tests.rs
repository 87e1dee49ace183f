/*!
 * Tests for the translator seam
 */

use xmlpack::translation::mock::MockTranslator;
use xmlpack::translation::{translate_structured_lines, LineTranslator};

fn lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(String::from).collect()
}

#[test]
fn test_mockTranslator_withoutEntry_shouldEcho() {
    let translator = MockTranslator::new();
    assert_eq!(translator.translate("Привет", "EN-US").unwrap(), "Привет");
    assert_eq!(translator.call_count(), 1);
}

#[test]
fn test_translateStructuredLines_crlf_shouldKeepTerminatorsAndMarkup() {
    let source = lines("<s id=\"a\"><text>Да</text></s>\r\n<s/>\r\n");
    let translator = MockTranslator::new().with_entry("Да", "Yes");

    let translated = translate_structured_lines(&source, &translator, "EN-US").unwrap();
    assert_eq!(translated, vec!["<s id=\"a\"><text>Yes</text></s>\r\n", "<s/>\r\n"]);
}

#[test]
fn test_translateStructuredLines_behindTraitObject_shouldWork() {
    let translator: Box<dyn LineTranslator> = Box::new(MockTranslator::new().with_entry("a", "b"));
    let source = lines("<text>a</text>\n");

    let translated = translate_structured_lines(&source, translator.as_ref(), "FR").unwrap();
    assert_eq!(translated.concat(), "<text>b</text>\n");
}
