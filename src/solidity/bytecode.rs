use minicbor::Decoder;

/// Lower-cased hex without the `0x` prefix.
pub fn normalize(code: &str) -> String {
    let code = code.trim();
    code.strip_prefix("0x")
        .or_else(|| code.strip_prefix("0X"))
        .unwrap_or(code)
        .to_ascii_lowercase()
}

/// Exact comparison modulo the `0x` prefix and hex case.
pub fn is_equal(deployed: &str, emitted: &str) -> bool {
    let deployed = normalize(deployed);
    !deployed.is_empty() && deployed == normalize(emitted)
}

/// Like [`is_equal`], but falls back to comparing the codes with their
/// trailing CBOR auxdata removed, so artifacts built from sources that
/// differ only in the metadata hash still match.
pub fn is_equal_ignoring_auxdata(deployed: &str, emitted: &str) -> bool {
    if is_equal(deployed, emitted) {
        return true;
    }
    let (deployed, emitted) = match (
        hex::decode(normalize(deployed)),
        hex::decode(normalize(emitted)),
    ) {
        (Ok(deployed), Ok(emitted)) => (deployed, emitted),
        _ => return false,
    };
    match (strip_auxdata(&deployed), strip_auxdata(&emitted)) {
        (Some(deployed), Some(emitted)) => !deployed.is_empty() && deployed == emitted,
        _ => false,
    }
}

/// Returns the code preceding the solc CBOR auxdata, if the code ends with one.
///
/// Solc appends a CBOR map followed by its length as two big-endian bytes.
pub fn strip_auxdata(code: &[u8]) -> Option<&[u8]> {
    let len = code.len();
    if len < 2 {
        return None;
    }
    let auxdata_len = u16::from_be_bytes([code[len - 2], code[len - 1]]) as usize;
    if auxdata_len == 0 || auxdata_len + 2 > len {
        return None;
    }
    let start = len - 2 - auxdata_len;
    is_auxdata_map(&code[start..len - 2]).then(|| &code[..start])
}

/// The whole slice must be exactly one CBOR map with text keys.
fn is_auxdata_map(encoded: &[u8]) -> bool {
    let mut decoder = Decoder::new(encoded);
    let entries = match decoder.map() {
        Ok(Some(entries)) if entries > 0 => entries,
        _ => return false,
    };
    for _ in 0..entries {
        if decoder.str().is_err() || decoder.skip().is_err() {
            return false;
        }
    }
    decoder.position() == encoded.len()
}
