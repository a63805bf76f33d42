/*!
 * Common test utilities and fixtures for the crossverse test suite
 */

use crossverse::corpus::{SourceDataset, Translation};
use crossverse::diagnostics::DiagnosticBuffer;
use crossverse::parser::{SourceFormat, TextParser};
use crossverse::validation::ValidationService;

/// A small Genesis 1 sample in one wording
pub fn kjv_genesis() -> &'static str {
    "Genesis\n\
     Chapter 1\n\
     1 In the beginning God created the heaven and the earth.\n\
     2 And the earth was without form, and void; and darkness was upon the face of the deep.\n\
     3 And God said, Let there be light: and there was light.\n\
     4 And God saw the light, that it was good: and God divided the light from the darkness.\n"
}

/// The same chapter with slightly different wording
pub fn web_genesis() -> &'static str {
    "Genesis\n\
     Chapter 1\n\
     1 In the beginning, God created the heavens and the earth.\n\
     2 The earth was formless and empty, and darkness was on the surface of the deep.\n\
     3 God said, Let there be light, and there was light.\n\
     4 God saw the light, and saw that it was good. God divided the light from the darkness.\n"
}

/// A dataset that merges two verses of the sample chapter into one
pub fn merged_genesis() -> &'static str {
    "Genesis\n\
     Chapter 1\n\
     1 In the beginning God created the heaven and the earth.\n\
     2 And the earth was without form, and void; and darkness was upon the face of the deep.\n\
     3 And God saw the light, that it was good: and God divided the light from the darkness.\n"
}

pub fn make_dataset(code: &str, text: &str) -> SourceDataset {
    SourceDataset::new(code, text)
}

/// Parse and validate one dataset text, the way the controller does
pub fn parse_and_validate(code: &str, text: &str) -> Translation {
    let parser = TextParser::new(SourceFormat::detect(text));
    let mut translation = parser
        .parse(text, code)
        .expect("fixture should parse")
        .translation;
    let mut diag = DiagnosticBuffer::new();
    ValidationService::new().validate(&mut translation, &mut diag);
    translation
}
