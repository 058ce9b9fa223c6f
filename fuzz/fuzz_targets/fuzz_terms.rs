#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for term in fre::utils::extract_terms(text) {
        assert!(!term.is_empty());
        assert!(!term.chars().any(char::is_whitespace));
    }
    for word in fre::utils::split_phrase(text) {
        assert!(!word.is_empty());
        assert!(!word.contains(' '));
    }
});
