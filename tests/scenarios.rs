//! Whole-document scenario tests exercised through the public API only.

use rtf_grimoire::{new_parser, rtf_to_html, HtmlOptions, PackageItem, Parser, ParserOptions};

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Build the hex payload of a static (embedded-content) OLE Package with a
/// single item, matching the grammar in the Package decoder.
fn static_package_hex(path: &str, data: &[u8]) -> String {
    let mut buf = Vec::new();
    buf.extend_from_slice(&0x0105_0000u32.to_be_bytes());
    buf.extend_from_slice(&2u32.to_le_bytes());

    let mut progid = b"Package\0".to_vec();
    buf.extend_from_slice(&(progid.len() as u32).to_le_bytes());
    buf.append(&mut progid);

    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());

    let mut body = Vec::new();
    body.extend_from_slice(&2u16.to_le_bytes());
    body.extend_from_slice(b"label\0");
    body.extend_from_slice(b"other\0");
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&3u16.to_le_bytes());

    let mut path_bytes = path.as_bytes().to_vec();
    path_bytes.push(0);
    body.extend_from_slice(&(path_bytes.len() as u32).to_le_bytes());
    body.extend_from_slice(&path_bytes);
    body.extend_from_slice(&(data.len() as u32).to_le_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(&0u16.to_le_bytes());

    let total_size = (body.len() + 2) as u32;
    buf.extend_from_slice(&total_size.to_le_bytes());
    buf.extend_from_slice(&body);

    hex(&buf)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

#[test]
fn s1_trivial_document() {
    init_tracing();
    let mut parser: Parser = new_parser("{\\rtf1 Hello}", ParserOptions::default()).unwrap();
    let doc = parser.document(false).unwrap();
    assert_eq!(doc.version, Some(1));

    let html = rtf_to_html("{\\rtf1 Hello}", HtmlOptions::default(), None).unwrap();
    assert!(html.contains("Hello"));
}

#[test]
fn s2_bold_run() {
    let html = rtf_to_html("{\\rtf1 \\b on\\b0 off}", HtmlOptions::default(), None).unwrap();
    assert!(html.contains("<B>on</B>off"));
}

#[test]
fn s3_font_table() {
    let mut parser = new_parser(
        "{\\rtf1{\\fonttbl{\\f0\\froman Times;}{\\f1\\fswiss Arial;}}}",
        ParserOptions::default(),
    )
    .unwrap();
    let doc = parser.document(false).unwrap();
    assert_eq!(doc.fonts[0].family.as_deref(), Some("roman"));
    assert_eq!(doc.fonts[0].name.as_deref(), Some("Times"));
    assert_eq!(doc.fonts[1].family.as_deref(), Some("swiss"));
    assert_eq!(doc.fonts[1].name.as_deref(), Some("Arial"));
}

#[test]
fn s4_color_table() {
    let mut parser = new_parser(
        "{\\rtf1{\\colortbl;\\red255\\green0\\blue0;\\red0\\green255\\blue0;}}",
        ParserOptions::default(),
    )
    .unwrap();
    let doc = parser.document(false).unwrap();
    let expected = [(0, 0, 0), (255, 0, 0), (0, 255, 0)];
    assert_eq!(doc.colors.len(), expected.len());
    for (color, (r, g, b)) in doc.colors.iter().zip(expected.iter()) {
        assert_eq!((color.r, color.g, color.b), (*r, *g, *b));
    }
}

#[test]
fn s5_hex_character() {
    let html = rtf_to_html("{\\rtf1 A\\'41B}", HtmlOptions::default(), None).unwrap();
    assert!(html.contains("AAB"));
}

#[test]
fn s6_ignorable_unknown_destination_is_skipped() {
    let html = rtf_to_html(
        "{\\rtf1{\\*\\unknown garbage}Kept}",
        HtmlOptions::default(),
        None,
    )
    .unwrap();
    assert!(html.contains("Kept"));

    let err = rtf_to_html("{\\rtf1{\\unknown garbage}Kept}", HtmlOptions::default(), None)
        .unwrap_err();
    assert!(matches!(err, rtf_grimoire::RtfError::UnhandledDestination { .. }));
}

#[test]
fn embedded_objdata_package_is_extracted_into_output_sink() {
    let objdata_hex = static_package_hex("C:\\temp\\readme.txt", b"hello world");
    let source = format!(
        "{{\\rtf1{{\\object{{\\objclass Package}}{{\\objdata {objdata_hex}}}}}}}"
    );

    let mut files: Vec<PackageItem> = Vec::new();
    rtf_to_html(&source, HtmlOptions::default(), Some(&mut files)).unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "readme.txt");
    assert_eq!(files[0].data.as_deref(), Some(b"hello world".as_slice()));
}

#[test]
fn non_package_objdata_is_left_undecoded_and_parse_still_succeeds() {
    let source = "{\\rtf1{\\object{\\objclass Word.Document.8}{\\objdata deadbeefnotpackage}}}";

    let mut files: Vec<PackageItem> = Vec::new();
    rtf_to_html(source, HtmlOptions::default(), Some(&mut files)).unwrap();

    assert!(files.is_empty());
}

#[test]
fn too_many_closing_braces_is_reported() {
    let mut parser = new_parser("{\\rtf1 Hi}}", ParserOptions::default()).unwrap();
    let err = parser.document(false).unwrap_err();
    assert!(matches!(err, rtf_grimoire::RtfError::TooManyCloses { .. }));
}
