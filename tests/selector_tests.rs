use talker_probe::dataset::parse_dataset_str;
use talker_probe::denylist::DenyList;
use talker_probe::selector::{filter_by_initial, select};

const DATASET: &str = r#"{
  "talkers": [
    {"name": "The Surfers", "hosts": [{"hostname": "surfers.example.org", "port": 3232}]},
    {"name": "Crystal Palace", "hosts": [
      {"hostname": "crystal.example.net", "port": 2010},
      {"hostname": "old.crystal.example.net", "port": 2010, "blocked": true}
    ]},
    {"name": "Placeholder", "hosts": [{"hostname": "203.0.113.5", "port": 23}]},
    {"name": "Ghost", "hosts": [{"hostname": "foo.talker.com", "port": 23}]},
    {"name": "Hostless"},
    {"name": "Broken", "hosts": [{"hostname": "broken.example.org"}]}
  ]
}"#;

#[test]
fn full_pipeline_drops_blocked_literal_defunct_and_invalid() {
    let ds = parse_dataset_str(DATASET).unwrap();
    let eps = select(&ds, &DenyList::builtin());

    let hostnames: Vec<_> = eps.iter().map(|e| e.hostname.as_str()).collect();
    assert_eq!(hostnames, vec!["crystal.example.net", "surfers.example.org"]);
}

#[test]
fn output_never_exceeds_input_and_is_sorted() {
    let ds = parse_dataset_str(DATASET).unwrap();
    let input_hosts: usize = ds.talkers.iter().map(|t| t.hosts.len()).sum();
    let eps = select(&ds, &DenyList::builtin());
    assert!(eps.len() <= input_hosts);

    let keys: Vec<_> = eps
        .iter()
        .map(|e| talker_probe::selector::sort_key(&e.name))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn letter_filter_selects_one_alphabetical_slice() {
    let ds = parse_dataset_str(DATASET).unwrap();
    let eps = select(&ds, &DenyList::builtin());

    let s_slice = filter_by_initial(eps.clone(), 's');
    assert_eq!(s_slice.len(), 1);
    assert_eq!(s_slice[0].name, "The Surfers");

    let x_slice = filter_by_initial(eps, 'x');
    assert!(x_slice.is_empty());
}

#[test]
fn custom_deny_list_replaces_the_builtin() {
    let ds = parse_dataset_str(
        r#"{"talkers": [{"name": "A", "hosts": [{"hostname": "chat.example.org", "port": 23}]}]}"#,
    )
    .unwrap();

    assert_eq!(select(&ds, &DenyList::builtin()).len(), 1);
    let custom = DenyList::parse("example.org\n").unwrap();
    assert!(select(&ds, &custom).is_empty());
}
