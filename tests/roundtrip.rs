use arena_json::{
    parse, parse_with_options, to_string, to_string_with_options, to_writer, Dict, Indent,
    ParseOptions, PrintOptions, Region, Value,
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case("{}")]
#[case("[]")]
#[case("null")]
#[case(r#"{"a":1,"b":[true,null,"x"]}"#)]
#[case(r#"{"s":"quote \" slash \\ nl \n tab \t ctl \u0001 uni é 😀"}"#)]
#[case(r#"[0, -0.5, 1e21, 123456789012, 2.5e-8, -7]"#)]
#[case(r#"[1.7976931348623157e308, -1.7976931348623157e308, 5e-324, 1e-400]"#)]
#[case(r#"{"deep":[[[{"x":[{}]}]]],"empty":"","arr":[[],{}]}"#)]
fn print_then_reparse_is_identical(#[case] input: &str) {
    let region = Region::new();
    let original = parse(input, &region).unwrap();
    let printed = to_string(&original);
    let reparsed = parse(&printed, &region).unwrap();
    assert_eq!(reparsed, original, "printed form:\n{printed}");
    assert_eq!(to_string(&reparsed), printed);
}

#[rstest]
#[case("[1e400]")]
#[case("[-1e400]")]
#[case(r#"{"n":1e999}"#)]
fn numbers_without_finite_form_never_print_as_null(#[case] input: &str) {
    let region = Region::new();
    let err = parse(input, &region).unwrap_err();
    assert!(err.is_parse());
    assert!(err.message.contains("out of range"), "{err}");
}

#[rstest]
fn printed_format_matches_layout() {
    let region = Region::new();
    let value = parse(r#"{"b":[1,{"c":null}],"a":"x","e":[],"d":{}}"#, &region).unwrap();
    let expected = concat!(
        "{\n",
        "\t\"a\": \"x\",\n",
        "\t\"b\": [\n",
        "\t\t1,\n",
        "\t\t{\n",
        "\t\t\t\"c\": null\n",
        "\t\t}\n",
        "\t],\n",
        "\t\"d\": {},\n",
        "\t\"e\": []\n",
        "}"
    );
    assert_eq!(to_string(&value), expected);
}

#[rstest]
#[case(Indent::Spaces(4), "[\n    true,\n    false\n]")]
#[case(Indent::Spaces(0), "[\ntrue,\nfalse\n]")]
#[case(Indent::Tab, "[\n\ttrue,\n\tfalse\n]")]
fn indent_options(#[case] indent: Indent, #[case] expected: &str) {
    let region = Region::new();
    let value = parse("[true,false]", &region).unwrap();
    let options = PrintOptions::new().with_indent(indent);
    assert_eq!(to_string_with_options(&value, &options), expected);
}

#[rstest]
#[case(r#"{"id":7,"name":"Ada","tags":["x","y"],"nested":{"ok":true,"none":null}}"#)]
#[case(r#"[1.5, -2, "esc\"aped\n", [], {}]"#)]
fn serde_view_matches_serde_json(#[case] input: &str) {
    let region = Region::new();
    let value = parse(input, &region).unwrap();
    let ours = serde_json::to_value(&value).unwrap();
    let theirs: serde_json::Value = serde_json::from_str(input).unwrap();
    assert_eq!(ours, theirs);
}

#[rstest]
fn serde_view_of_integers_and_floats() {
    let region = Region::new();
    let value = parse("[3, 3.25, 9007199254740993]", &region).unwrap();
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(json[0], json!(3));
    assert_eq!(json[1], json!(3.25));
    assert!(json[2].is_f64());
}

#[rstest]
fn raw_escapes_survive_printing() {
    let region = Region::new();
    let input = r#"["a\"b", "tab\there"]"#;
    let raw = ParseOptions::new().with_escapes(arena_json::EscapePolicy::Raw);
    let value = parse_with_options(input, &region, &raw).unwrap();
    let printed = to_string(&value);
    assert_eq!(printed, "[\n\t\"a\\\"b\",\n\t\"tab\\there\"\n]");

    let decoded = parse(&printed, &region).unwrap();
    assert_eq!(decoded.get_index(0).and_then(Value::as_str), Some("a\"b"));
    assert_eq!(decoded.get_index(1).and_then(Value::as_str), Some("tab\there"));
}

#[rstest]
fn built_trees_print_like_parsed_ones() {
    let region = Region::new();
    let mut root = Value::dict_in(&region);
    *root.entry("name").unwrap() = Value::from("Ada");
    let list = root.entry("list").unwrap();
    *list = Value::array_in(&region);
    let items = list.as_array_mut().unwrap();
    items.push(Value::Number(1.0)).unwrap();
    items.push(Value::Bool(false)).unwrap();

    let parsed = parse(r#"{"list":[1,false],"name":"Ada"}"#, &region).unwrap();
    assert_eq!(root, parsed);
    assert_eq!(to_string(&root), to_string(&parsed));
}

#[rstest]
fn writer_output_matches_string() {
    let region = Region::new();
    let value = parse(r#"{"k":[1,2,3]}"#, &region).unwrap();
    let mut sink = Vec::new();
    to_writer(&mut sink, &value).unwrap();
    assert_eq!(sink, to_string(&value).into_bytes());
}

#[rstest]
fn try_clone_is_independent() {
    let region = Region::new();
    let original = parse(r#"{"a":{"b":[1]}}"#, &region).unwrap();
    let mut copy = original.try_clone().unwrap();
    assert_eq!(copy, original);

    let inner: &mut Dict = copy.as_dict_mut().unwrap();
    inner.remove("a");
    assert_ne!(copy, original);
    assert!(original.get("a").is_some());
}
