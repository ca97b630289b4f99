use indexmap::IndexMap;
use lims_descriptors::{
    AttributeList, BindError, EntityKind, EntityList, EntityListDescriptor, ExternalIdList,
    IdentityCache, OutputPlacementList, ReagentLabelList, Session, StringDescriptor, StringList,
};
use lims_xml::namespace::RI;
use lims_xml::{Element, QName};
use proptest::prelude::*;

const BASE: &str = "http://testgenologics.com:4040";

fn artifacts_with_sibling() -> Element {
    Element::parse(&format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<test-entry>
<artifact uri="{BASE}/api/v2/artifacts/a1"></artifact>
<artifact uri="{BASE}/api/v2/artifacts/a2"></artifact>
<other>thing</other>
</test-entry>"#
    ))
    .unwrap()
}

fn artifact_uris(root: &Element) -> Vec<&str> {
    root.find_all(&QName::local("artifact"))
        .filter_map(|a| a.attr("uri"))
        .collect()
}

// ── EntityList ─────────────────────────────────────────────────────────────

#[test]
fn entity_list_get() {
    let session = Session::new(BASE);
    let a1 = session.entity(EntityKind::Artifact, "a1");
    let a2 = session.entity(EntityKind::Artifact, "a2");

    let mut flat = artifacts_with_sibling();
    let list = EntityList::new(&mut flat, &session, "artifact", EntityKind::Artifact, &[]).unwrap();
    assert_eq!(list.as_slice(), [a1.clone(), a2.clone()]);

    let mut nested = Element::parse(&format!(
        r#"<test-entry><nesting>
<artifact uri="{BASE}/api/v2/artifacts/a1"/>
<artifact uri="{BASE}/api/v2/artifacts/a2"/>
</nesting></test-entry>"#
    ))
    .unwrap();
    let list =
        EntityList::new(&mut nested, &session, "artifact", EntityKind::Artifact, &["nesting"])
            .unwrap();
    assert!(std::rc::Rc::ptr_eq(&list[0], &a1));
    assert_eq!(list[1], a2);
}

#[test]
fn entity_list_append() {
    let session = Session::new(BASE);
    let a3 = session.entity(EntityKind::Artifact, "a3");
    let mut root = artifacts_with_sibling();
    {
        let mut list =
            EntityList::new(&mut root, &session, "artifact", EntityKind::Artifact, &[]).unwrap();
        assert_eq!(list.len(), 2);
        list.append(a3.clone());
        assert_eq!(list.len(), 3);
        assert_eq!(list[2], a3);
    }
    assert_eq!(artifact_uris(&root).len(), 3);
    assert_eq!(artifact_uris(&root)[2], a3.uri());
}

#[test]
fn entity_list_insert_goes_before_existing_node() {
    let session = Session::new(BASE);
    let a2 = session.entity(EntityKind::Artifact, "a2");
    let a3 = session.entity(EntityKind::Artifact, "a3");
    let mut root = artifacts_with_sibling();
    {
        let mut list =
            EntityList::new(&mut root, &session, "artifact", EntityKind::Artifact, &[]).unwrap();
        list.insert(1, a3.clone());
        assert_eq!(list.len(), 3);
        assert_eq!(list[1], a3);
        assert_eq!(list[2], a2);
    }
    let names: Vec<_> = root.children().iter().map(|c| c.name.local.as_str()).collect();
    assert_eq!(names, ["artifact", "artifact", "artifact", "other"]);
    assert_eq!(artifact_uris(&root)[1], a3.uri());
}

#[test]
fn entity_list_set_in_place() {
    let session = Session::new(BASE);
    let a3 = session.entity(EntityKind::Artifact, "a3");
    let mut root = artifacts_with_sibling();
    {
        let mut list =
            EntityList::new(&mut root, &session, "artifact", EntityKind::Artifact, &[]).unwrap();
        list.set(1, a3.clone()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1], a3);
        assert_eq!(
            list.set(5, a3.clone()),
            Err(BindError::IndexOutOfRange { index: 5, len: 2 })
        );
    }
    assert_eq!(
        artifact_uris(&root)[1],
        "http://testgenologics.com:4040/api/v2/artifacts/a3"
    );
}

#[test]
fn entity_list_set_drops_stale_attributes() {
    let session = Session::new(BASE);
    let a3 = session.entity(EntityKind::Artifact, "a3");
    let mut root = Element::parse(&format!(
        r#"<test-entry><artifact uri="{BASE}/api/v2/artifacts/a1" limsid="a1"/><other>thing</other></test-entry>"#
    ))
    .unwrap();
    EntityList::new(&mut root, &session, "artifact", EntityKind::Artifact, &[])
        .unwrap()
        .set(0, a3.clone())
        .unwrap();
    let node = root.find(&QName::local("artifact")).unwrap();
    assert_eq!(node.attr("uri"), Some(a3.uri()));
    assert_eq!(node.attr("limsid"), None);
    assert_eq!(root.children()[0].name, QName::local("artifact"));
    assert_eq!(root.child_count(), 2);
}

#[test]
fn entity_list_set_range() {
    let session = Session::new(BASE);
    let ids = ["a3", "a4", "a5"].map(|id| session.entity(EntityKind::Artifact, id));
    let mut root = artifacts_with_sibling();
    let mut list =
        EntityList::new(&mut root, &session, "artifact", EntityKind::Artifact, &[]).unwrap();

    list.set_range(0..2, ids[..2].iter().cloned()).unwrap();
    assert_eq!(list.as_slice(), &ids[..2]);

    list.set_range(1..2, ids.iter().cloned()).unwrap();
    assert_eq!(list.len(), 4);
    assert_eq!(list[0], ids[0]);
    assert_eq!(list[3], ids[2]);

    list.set_range(0..3, std::iter::empty()).unwrap();
    assert_eq!(list.as_slice(), &ids[2..]);
    assert!(list.set_range(2..5, std::iter::empty()).is_err());
    drop(list);
    assert_eq!(artifact_uris(&root), [ids[2].uri()]);
}

#[test]
fn entity_list_clear_keeps_other_children() {
    let session = Session::new(BASE);
    let mut root = artifacts_with_sibling();
    let other = StringDescriptor::new("other");
    assert_eq!(other.get(&root).as_deref(), Some("thing"));
    {
        let mut list =
            EntityList::new(&mut root, &session, "artifact", EntityKind::Artifact, &[]).unwrap();
        list.clear();
        assert!(list.is_empty());
    }
    assert_eq!(other.get(&root).as_deref(), Some("thing"));
    assert!(artifact_uris(&root).is_empty());
}

#[test]
fn entity_list_remove() {
    let session = Session::new(BASE);
    let mut root = artifacts_with_sibling();
    let mut list =
        EntityList::new(&mut root, &session, "artifact", EntityKind::Artifact, &[]).unwrap();
    let removed = list.remove(0).unwrap();
    assert_eq!(removed.id(), "a1");
    assert_eq!(list[0].id(), "a2");
    list.append(removed);
    drop(list);
    assert_eq!(
        artifact_uris(&root),
        [
            "http://testgenologics.com:4040/api/v2/artifacts/a2",
            "http://testgenologics.com:4040/api/v2/artifacts/a1"
        ]
    );
}

#[test]
fn entity_list_descriptor_get_and_set() {
    let session = Session::new(BASE);
    let mut root = artifacts_with_sibling();
    let desc = EntityListDescriptor::new("artifact", EntityKind::Artifact);
    let got = desc.get(&root, &session).unwrap();
    assert_eq!(got.iter().map(|a| a.id()).collect::<Vec<_>>(), ["a1", "a2"]);

    let a9 = session.entity(EntityKind::Artifact, "a9");
    desc.set(&mut root, &session, [a9.clone()]).unwrap();
    assert_eq!(desc.get(&root, &session).unwrap(), [a9]);
    assert_eq!(root.child_count(), 2);
}

#[test]
fn missing_uri_fails_construction() {
    let session = Session::new(BASE);
    let mut root = Element::parse("<e><artifact/></e>").unwrap();
    assert!(matches!(
        EntityList::new(&mut root, &session, "artifact", EntityKind::Artifact, &[]),
        Err(BindError::MissingAttribute { attr: "uri", .. })
    ));
}

// ── Other list shapes ──────────────────────────────────────────────────────

#[test]
fn string_list_created_under_nesting() {
    let mut root = Element::new("container");
    let mut wells = StringList::new(&mut root, "well", &["placements"]).unwrap();
    wells.extend(["A:1".to_owned(), "B:1".to_owned()]);
    assert_eq!(wells.to_vec(), ["A:1", "B:1"]);
    drop(wells);
    let container = root.find(&QName::local("placements")).unwrap();
    assert_eq!(container.count(&QName::local("well")), 2);
}

#[test]
fn external_ids() {
    let mut root = Element::parse(&format!(
        r#"<test-entry>
<ri:externalid xmlns:ri="http://genologics.com/ri" id="1" uri="{BASE}/api/v2/external/1" />
<ri:externalid xmlns:ri="http://genologics.com/ri" id="2" uri="{BASE}/api/v2/external/2" />
</test-entry>"#
    ))
    .unwrap();
    {
        let mut ids = ExternalIdList::new(&mut root, &[]).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], ("1".to_owned(), format!("{BASE}/api/v2/external/1")));
        ids.append(("3".to_owned(), format!("{BASE}/api/v2/external/3")));
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[2].0, "3");
    }
    let third = root.find_all(&QName::new(RI, "externalid")).nth(2).unwrap();
    assert_eq!(third.attr("id"), Some("3"));
    assert_eq!(third.attr("uri"), Some("http://testgenologics.com:4040/api/v2/external/3"));
}

fn attribute_entry() -> Element {
    Element::parse(
        r#"<test-entry>
<test-tags>
<test-tag attrib1="value1" attrib2="value2"/>
<test-tag attrib1="value11" attrib2="value12" attrib3="value13"/>
</test-tags>
</test-entry>"#,
    )
    .unwrap()
}

fn attrs(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

#[test]
fn attribute_list_get_append_insert() {
    let mut root = attribute_entry();
    {
        let mut list = AttributeList::new(&mut root, "test-tag", &["test-tags"]).unwrap();
        assert_eq!(list[0], attrs(&[("attrib1", "value1"), ("attrib2", "value2")]));
        assert_eq!(list[1].len(), 3);
        list.append_attrs([("attrib1", "value21")]);
        list.insert(1, attrs(&[("attrib1", "value31")]));
    }
    let tags: Vec<_> = root
        .find(&QName::local("test-tags"))
        .unwrap()
        .children()
        .iter()
        .map(|t| t.attr("attrib1").unwrap_or_default())
        .collect();
    assert_eq!(tags, ["value1", "value31", "value11", "value21"]);
}

#[test]
fn reagent_labels() {
    let mut root =
        Element::parse(r#"<test-entry><reagent-label name="label name"/></test-entry>"#).unwrap();
    {
        let mut labels = ReagentLabelList::new(&mut root, &[]).unwrap();
        assert_eq!(labels.as_slice(), ["label name"]);
        labels.append("another label".to_owned());
        assert_eq!(labels.as_slice(), ["label name", "another label"]);
    }
    let second = root
        .find_all(&QName::local("reagent-label"))
        .nth(1)
        .unwrap();
    assert_eq!(second, &Element::new("reagent-label").with_attr("name", "another label"));
}

#[test]
fn output_placements() {
    let session = Session::new(BASE);
    let mut root = Element::parse(&format!(
        r#"<stp:placements xmlns:stp="http://genologics.com/ri/step">
<output-placements>
<output-placement uri="{BASE}/api/v2/artifacts/o1">
<location><container uri="{BASE}/api/v2/containers/c1"/><value>A:1</value></location>
</output-placement>
</output-placements>
</stp:placements>"#
    ))
    .unwrap();
    let c1 = session.entity(EntityKind::Container, "c1");
    let o2 = session.entity(EntityKind::Artifact, "o2");
    let mut placements = OutputPlacementList::new(&mut root, &session).unwrap();
    let (artifact, (container, well)) = &placements[0];
    assert_eq!(artifact.id(), "o1");
    assert!(std::rc::Rc::ptr_eq(container, &c1));
    assert_eq!(well, "A:1");

    placements.append((o2.clone(), (c1.clone(), "B:1".to_owned())));
    drop(placements);
    let reread = OutputPlacementList::new(&mut root, &session).unwrap();
    assert_eq!(reread.len(), 2);
    assert_eq!(reread[1], (o2, (c1, "B:1".to_owned())));
}

#[test]
fn output_placement_set_rewrites_whole_node() {
    let session = Session::new(BASE);
    let mut root = Element::parse(&format!(
        r#"<stp:placements xmlns:stp="http://genologics.com/ri/step">
<output-placements>
<output-placement uri="{BASE}/api/v2/artifacts/o1" limsid="o1">
<location><container uri="{BASE}/api/v2/containers/c1" limsid="c1"/><value>A:1</value></location>
</output-placement>
</output-placements>
</stp:placements>"#
    ))
    .unwrap();
    let o2 = session.entity(EntityKind::Artifact, "o2");
    let c2 = session.entity(EntityKind::Container, "c2");
    {
        let mut placements = OutputPlacementList::new(&mut root, &session).unwrap();
        placements
            .set(0, (o2.clone(), (c2.clone(), "B:2".to_owned())))
            .unwrap();
    }
    let node = root
        .descendants()
        .find(|e| e.name == QName::local("output-placement"))
        .unwrap();
    assert_eq!(node.attr("limsid"), None);
    assert_eq!(node.attr("uri"), Some(o2.uri()));
    let container = node
        .find(&QName::local("location"))
        .and_then(|l| l.find(&QName::local("container")))
        .unwrap();
    assert_eq!(container.attr("uri"), Some(c2.uri()));
    assert_eq!(container.attr("limsid"), None);

    let reread = OutputPlacementList::new(&mut root, &session).unwrap();
    assert_eq!(reread[0], (o2, (c2, "B:2".to_owned())));
}

#[test]
fn identity_is_shared_across_bindings() {
    let session = Session::new(BASE);
    let mut root = artifacts_with_sibling();
    let first = EntityListDescriptor::new("artifact", EntityKind::Artifact)
        .get(&root, &session)
        .unwrap();
    let list =
        EntityList::new(&mut root, &session, "artifact", EntityKind::Artifact, &[]).unwrap();
    assert!(std::rc::Rc::ptr_eq(&first[0], &list[0]));
    assert!(std::rc::Rc::ptr_eq(
        &list[1],
        &session.resolve(EntityKind::Artifact, &format!("{BASE}/api/v2/artifacts/a2"))
    ));
}

proptest! {
    #[test]
    fn appends_track_document(values in proptest::collection::vec("[A-H]:[1-9]", 0..12)) {
        let mut root = Element::new("e").with_child(Element::new("other"));
        let mut list = StringList::new(&mut root, "well", &[]).unwrap();
        for (i, v) in values.iter().enumerate() {
            list.append(v.clone());
            prop_assert_eq!(list.len(), i + 1);
        }
        drop(list);
        let stored: Vec<_> = root
            .find_all(&QName::local("well"))
            .map(|w| w.text().unwrap_or_default().to_owned())
            .collect();
        prop_assert_eq!(stored, values);
        prop_assert_eq!(root.children()[0].name.local.as_str(), "other");
    }

    #[test]
    fn removing_everything_restores_the_original(
        values in proptest::collection::vec("[a-z]{1,4}", 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let original = Element::new("e").with_child(Element::new("other").with_text("thing"));
        let mut root = original.clone();
        let mut list = StringList::new(&mut root, "v", &[]).unwrap();
        list.extend(values.iter().cloned());
        let i = pick.index(values.len());
        prop_assert_eq!(&list.remove(i).unwrap(), &values[i]);
        while !list.is_empty() {
            list.remove(0).unwrap();
        }
        drop(list);
        prop_assert_eq!(root, original);
    }
}
