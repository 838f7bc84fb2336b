use crate::dataset::Dataset;
use crate::denylist::DenyList;
use crate::types::Endpoint;
use std::net::Ipv4Addr;

/// Derive the probeable endpoint set from the raw dataset.
///
/// Pure pipeline over the talker list, deterministic for a given dataset:
/// flatten each talker's hosts, drop blocked entries, drop entries without a
/// usable hostname or port, drop dotted-quad IPv4 literals (placeholder
/// addresses, not probe targets), drop deny-listed hostnames, then sort by
/// display name with a leading "the " stripped.
pub fn select(dataset: &Dataset, deny: &DenyList) -> Vec<Endpoint> {
    let mut out = Vec::new();
    for talker in &dataset.talkers {
        for host in &talker.hosts {
            if host.blocked {
                continue;
            }
            let Some(hostname) = host.hostname.as_deref().filter(|h| !h.trim().is_empty()) else {
                continue;
            };
            let Some(port) = host.port.filter(|p| (1..=65_535).contains(p)) else {
                continue;
            };
            if hostname.parse::<Ipv4Addr>().is_ok() {
                continue;
            }
            if deny.matches(hostname) {
                continue;
            }
            out.push(Endpoint {
                name: talker.name.clone(),
                hostname: hostname.to_string(),
                port: port as u16,
            });
        }
    }

    out.sort_by(|a, b| {
        sort_key(&a.name)
            .cmp(&sort_key(&b.name))
            .then_with(|| a.name.cmp(&b.name))
    });
    out
}

/// Restrict an endpoint list to names whose sort key starts with `letter`.
///
/// Used by the on-demand query path to keep a single run inside its
/// wall-clock ceiling by probing one alphabetical slice at a time.
pub fn filter_by_initial(endpoints: Vec<Endpoint>, letter: char) -> Vec<Endpoint> {
    let letter = letter.to_ascii_lowercase();
    endpoints
        .into_iter()
        .filter(|e| sort_key(&e.name).starts_with(letter))
        .collect()
}

/// Lowercased display name with a leading "the " stripped.
pub fn sort_key(name: &str) -> String {
    let lower = name.to_lowercase();
    match lower.strip_prefix("the ") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}
