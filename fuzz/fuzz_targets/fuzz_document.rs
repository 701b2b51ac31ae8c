//! Fuzz target: `Document::from_json`
//!
//! Feeds arbitrary reply text to the document parser. Anything it accepts
//! must serialize again and parse back to an equal document.
//!
//! cargo fuzz run fuzz_document

#![no_main]

use libfuzzer_sys::fuzz_target;
use notelink::json::Document;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = Document::from_json(data) else {
        return;
    };

    let json = doc.to_json().expect("parsed document must serialize");
    let again = Document::from_json(&json).expect("serialized document must parse");
    assert_eq!(again.len(), doc.len());
});
