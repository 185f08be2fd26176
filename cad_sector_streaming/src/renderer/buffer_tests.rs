//! Unit tests for Buffer module
//!
//! Tests BufferFormat::size_bytes() for every attribute format.

use crate::renderer::BufferFormat;

#[test]
fn test_buffer_format_size_bytes_float_formats() {
    assert_eq!(BufferFormat::R32_SFLOAT.size_bytes(), 4);
    assert_eq!(BufferFormat::R32G32_SFLOAT.size_bytes(), 8);
    assert_eq!(BufferFormat::R32G32B32_SFLOAT.size_bytes(), 12);
    assert_eq!(BufferFormat::R32G32B32A32_SFLOAT.size_bytes(), 16);
}

#[test]
fn test_buffer_format_size_bytes_integer_formats() {
    assert_eq!(BufferFormat::R32_UINT.size_bytes(), 4);
    assert_eq!(BufferFormat::R32G32_UINT.size_bytes(), 8);
    assert_eq!(BufferFormat::R32G32B32A32_UINT.size_bytes(), 16);
    // Packed RGBA8 color is one 4-byte element
    assert_eq!(BufferFormat::R8G8B8A8_UINT.size_bytes(), 4);
}
