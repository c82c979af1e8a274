
/// Encode one version-resource `String` block (header, key, padding, value).
pub(super) fn version_block(key: &str, value: &str) -> Vec<u8> {
    let key_units: Vec<u16> = key.encode_utf16().chain(std::iter::once(0)).collect();
    let value_units: Vec<u16> = value.encode_utf16().chain(std::iter::once(0)).collect();

    let mut block = Vec::new();
    block.extend_from_slice(&0u16.to_le_bytes()); // wLength, patched below
    block.extend_from_slice(&(value_units.len() as u16).to_le_bytes());
    block.extend_from_slice(&1u16.to_le_bytes()); // text
    for u in &key_units {
        block.extend_from_slice(&u.to_le_bytes());
    }
    while block.len() % 4 != 0 {
        block.push(0);
    }
    for u in &value_units {
        block.extend_from_slice(&u.to_le_bytes());
    }
    let len = block.len() as u16;
    block[0..2].copy_from_slice(&len.to_le_bytes());
    while block.len() % 4 != 0 {
        block.push(0);
    }
    block
}

/// Fake binary: some leading bytes followed by the given string blocks
pub(super) fn fake_binary(blocks: &[(&str, &str)]) -> Vec<u8> {
    let mut bytes = b"MZ\x90\x00fake-header".to_vec();
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    for (key, value) in blocks {
        bytes.extend(version_block(key, value));
    }
    bytes
}
