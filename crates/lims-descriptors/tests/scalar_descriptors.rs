use lims_descriptors::{
    BindError, BooleanDescriptor, Dimension, DimensionDescriptor, IntegerDescriptor,
    StringAttributeDescriptor, StringDescriptor, StringDictionaryDescriptor, StringListDescriptor,
};
use lims_xml::{Element, QName};

fn parse(xml: &str) -> Element {
    Element::parse(xml).unwrap()
}

fn child_text<'e>(root: &'e Element, tag: &str) -> Option<&'e str> {
    root.find(&QName::local(tag)).and_then(Element::text)
}

#[test]
fn string_get_set_create() {
    let mut root = parse("<test-entry><name>test name</name></test-entry>");
    let name = StringDescriptor::new("name");
    assert_eq!(name.get(&root).as_deref(), Some("test name"));

    name.set(&mut root, "new test name");
    assert_eq!(child_text(&root, "name"), Some("new test name"));

    let mut fresh = Element::new("test-entry");
    assert_eq!(name.get(&fresh), None);
    name.set(&mut fresh, "test name");
    assert_eq!(child_text(&fresh, "name"), Some("test name"));
}

#[test]
fn string_read_does_not_create() {
    let root = Element::new("test-entry");
    let nested = StringDescriptor::nested("name", &["a", "b"]);
    assert_eq!(nested.get(&root), None);
    assert_eq!(root.child_count(), 0);
}

#[test]
fn integer_get_set_create() {
    let mut root = parse(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<test-entry>
<count>32</count>
</test-entry>"#,
    );
    let count = IntegerDescriptor::new("count");
    assert_eq!(count.get(&root), Ok(Some(32)));

    count.set(&mut root, 23);
    assert_eq!(child_text(&root, "count"), Some("23"));

    let mut fresh = Element::new("test-entry");
    count.set(&mut fresh, 23);
    assert_eq!(child_text(&fresh, "count"), Some("23"));
}

#[test]
fn integer_rejects_garbage() {
    let root = parse("<e><count>many</count></e>");
    assert!(matches!(
        IntegerDescriptor::new("count").get(&root),
        Err(BindError::MalformedValue { expected: "integer", .. })
    ));
}

#[test]
fn boolean_get_set_create() {
    let mut root = parse("<test-entry><istest>true</istest></test-entry>");
    let flag = BooleanDescriptor::new("istest");
    assert!(flag.get(&root));

    flag.set(&mut root, false).unwrap();
    assert_eq!(child_text(&root, "istest"), Some("false"));
    flag.set(&mut root, "true").unwrap();
    assert_eq!(child_text(&root, "istest"), Some("true"));

    let mut fresh = Element::new("test-entry");
    assert!(!flag.get(&fresh));
    flag.set(&mut fresh, true).unwrap();
    assert_eq!(child_text(&fresh, "istest"), Some("true"));
}

#[test]
fn boolean_rejects_other_literals() {
    let mut root = parse("<e><istest>true</istest></e>");
    let flag = BooleanDescriptor::new("istest");
    assert_eq!(
        flag.set(&mut root, "yes"),
        Err(BindError::MalformedValue {
            expected: "boolean",
            value: "yes".into()
        })
    );
    assert_eq!(child_text(&root, "istest"), Some("true"));
}

#[test]
fn string_attribute_get_set_create() {
    let mut root = parse(r#"<test-entry name="test name"></test-entry>"#);
    let name = StringAttributeDescriptor::new("name");
    assert_eq!(name.get(&root).as_deref(), Some("test name"));
    name.set(&mut root, "test name2");
    assert_eq!(root.attr("name"), Some("test name2"));

    let mut fresh = Element::new("test-entry");
    name.set(&mut fresh, "test name2");
    assert_eq!(fresh.attr("name"), Some("test name2"));
}

#[test]
fn string_list_get_and_replace() {
    let mut flat = parse(
        "<test-entry><test-subentry>A01</test-subentry><test-subentry>B01</test-subentry></test-entry>",
    );
    let nested = parse(
        "<test-entry><nesting><test-subentry>A01</test-subentry><test-subentry>B01</test-subentry></nesting></test-entry>",
    );

    let sd = StringListDescriptor::new("test-subentry");
    assert_eq!(sd.get(&flat), ["A01", "B01"]);
    let sd_nested = StringListDescriptor::nested("test-subentry", &["nesting"]);
    assert_eq!(sd_nested.get(&nested), ["A01", "B01"]);

    sd.set(&mut flat, ["A02", "B02"]).unwrap();
    assert_eq!(sd.get(&flat), ["A02", "B02"]);
    assert_eq!(flat.child_count(), 2);
}

#[test]
fn string_dictionary_get_and_replace() {
    let mut root = parse(
        "<test-entry><test-subentry><test-firstkey/><test-secondkey>second value</test-secondkey></test-subentry></test-entry>",
    );
    let sd = StringDictionaryDescriptor::new("test-subentry");

    let res = sd.get(&root);
    assert_eq!(res["test-firstkey"], None);
    assert_eq!(res["test-secondkey"].as_deref(), Some("second value"));

    sd.set(&mut root, [("mykey1", "myvalue1")]);
    let res = sd.get(&root);
    assert_eq!(res.len(), 1);
    assert_eq!(res["mykey1"].as_deref(), Some("myvalue1"));
}

#[test]
fn dimension_round_trip() {
    let mut root = parse(
        "<container-type><x-dimension><is-alpha>false</is-alpha><offset>1</offset><size>12</size></x-dimension></container-type>",
    );
    let x = DimensionDescriptor::new("x-dimension");
    assert_eq!(
        x.get(&root),
        Ok(Some(Dimension {
            is_alpha: false,
            offset: 1,
            size: 12
        }))
    );

    let y = DimensionDescriptor::new("y-dimension");
    assert_eq!(y.get(&root), Ok(None));
    let dim = Dimension {
        is_alpha: true,
        offset: 0,
        size: 8,
    };
    y.set(&mut root, dim).unwrap();
    assert_eq!(y.get(&root), Ok(Some(dim)));
}

#[test]
fn dimension_missing_size_is_reported() {
    let root = parse("<ct><x-dimension><offset>1</offset></x-dimension></ct>");
    assert_eq!(
        DimensionDescriptor::new("x-dimension").get(&root),
        Err(BindError::MissingElement("x-dimension/size".into()))
    );
}
