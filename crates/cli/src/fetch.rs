//! Directory fetch adapter.
//!
//! Pages through a JSON:API location collection, joins `paragraph--address`
//! includes to their locations through `node--contact_information`
//! relationships, and writes the flattened locations to the cache file the
//! `validate` command reads.

use std::path::Path;
use std::thread;
use std::time::Duration;

use courtsync_recon::model::{DirectoryAddress, DirectoryLocation};
use courtsync_recon::normalize::normalize_text;
use serde_json::Value;
use url::Url;

use crate::exit_codes;
use crate::CliError;

// ── Constants ───────────────────────────────────────────────────────

const MAX_RETRIES: u32 = 3;
const USER_AGENT: &str = concat!("courtsync/", env!("CARGO_PKG_VERSION"));

/// Contact-info relationship keys on a location node, each expanded one
/// level further to its referenced addresses.
const CONTACT_RELATIONSHIPS: [&str; 2] = ["field_ref_contact_info", "field_ref_contact_info_1"];

const INCLUDE_PARAM: &str = "field_ref_contact_info,field_ref_contact_info.field_ref_address,\
field_ref_contact_info_1,field_ref_contact_info_1.field_ref_address";

/// Pause between pages; the upstream is a shared government endpoint.
const PAGE_DELAY: Duration = Duration::from_millis(250);

// ── Command ─────────────────────────────────────────────────────────

pub fn cmd_fetch(endpoint: &str, filter: &str, out: &Path, page_size: u32) -> Result<(), CliError> {
    let endpoint = Url::parse(endpoint)
        .map_err(|e| CliError::args(format!("invalid --endpoint {endpoint:?}: {e}")))?;

    let client = FetchClient::new("directory")?;
    let mut locations: Vec<DirectoryLocation> = Vec::new();
    let mut offset: u32 = 0;
    let limit = page_size.to_string();

    loop {
        let page_offset = offset.to_string();
        let payload = client.get_with_retry(|http| {
            http.get(endpoint.clone()).query(&[
                ("filter[title][operator]", "CONTAINS"),
                ("filter[title][value]", filter),
                ("page[limit]", limit.as_str()),
                ("page[offset]", page_offset.as_str()),
                ("include", INCLUDE_PARAM),
            ])
        })?;

        let (page, has_next) = parse_page(&payload);
        eprintln!("fetched {} locations (offset {offset})", page.len());
        locations.extend(page);

        if !has_next {
            break;
        }
        offset += page_size;
        thread::sleep(PAGE_DELAY);
    }

    let json = serde_json::to_string_pretty(&locations)
        .map_err(|e| CliError::io(format!("cannot serialize cache: {e}")))?;
    std::fs::write(out, json + "\n")
        .map_err(|e| CliError::io(format!("cannot write {}: {}", out.display(), e)))?;

    println!("wrote {} locations to {}", locations.len(), out.display());
    Ok(())
}

// ── Page parsing ────────────────────────────────────────────────────

/// Flatten one JSON:API page into locations. Returns the locations and
/// whether a `links.next` page follows.
fn parse_page(payload: &Value) -> (Vec<DirectoryLocation>, bool) {
    let empty = Vec::new();
    let included = payload["included"].as_array().unwrap_or(&empty);

    // paragraph--address includes, keyed by id
    let mut address_by_id = std::collections::HashMap::new();
    // node--contact_information -> referenced address ids
    let mut contact_to_addresses = std::collections::HashMap::new();

    for inc in included {
        let Some(id) = inc["id"].as_str() else { continue };
        match inc["type"].as_str() {
            Some("paragraph--address") => {
                let addr = &inc["attributes"]["field_address_address"];
                address_by_id.insert(
                    id,
                    DirectoryAddress {
                        line1: str_field(addr, "address_line1"),
                        line2: str_field(addr, "address_line2"),
                        city: str_field(addr, "locality"),
                        state: str_field(addr, "administrative_area"),
                        postal_code: str_field(addr, "postal_code"),
                        country: str_field(addr, "country_code"),
                    },
                );
            }
            Some("node--contact_information") => {
                let rel = &inc["relationships"]["field_ref_address"]["data"];
                contact_to_addresses.insert(id, relationship_ids(rel));
            }
            _ => {}
        }
    }

    let mut locations = Vec::new();
    for node in payload["data"].as_array().unwrap_or(&empty) {
        let attrs = &node["attributes"];
        let title = str_field(attrs, "title");
        let path_alias = attrs["path"]["alias"].as_str().map(String::from);

        let mut contact_ids = Vec::new();
        for key in CONTACT_RELATIONSHIPS {
            contact_ids.extend(relationship_ids(&node["relationships"][key]["data"]));
        }

        let mut addresses: Vec<DirectoryAddress> = Vec::new();
        for contact_id in &contact_ids {
            for addr_id in contact_to_addresses.get(contact_id.as_str()).into_iter().flatten() {
                let Some(addr) = address_by_id.get(addr_id.as_str()) else {
                    continue;
                };
                if !addresses.contains(addr) {
                    addresses.push(addr.clone());
                }
            }
        }

        let cities = addresses
            .iter()
            .filter(|a| !a.city.is_empty())
            .map(|a| normalize_text(&a.city))
            .collect();

        locations.push(DirectoryLocation {
            title,
            id: node["id"].as_str().unwrap_or_default().to_string(),
            path_alias,
            addresses,
            cities,
        });
    }

    let has_next = payload["links"].get("next").is_some();
    (locations, has_next)
}

fn str_field(value: &Value, key: &str) -> String {
    value[key].as_str().unwrap_or_default().to_string()
}

/// Relationship `data` may be a single object, a list, or null.
fn relationship_ids(rel: &Value) -> Vec<String> {
    match rel {
        Value::Array(items) => items
            .iter()
            .filter_map(|r| r["id"].as_str().map(String::from))
            .collect(),
        Value::Object(_) => rel["id"].as_str().map(String::from).into_iter().collect(),
        _ => Vec::new(),
    }
}

// ── FetchClient ─────────────────────────────────────────────────────

/// Blocking HTTP client with retry, backoff, and error classification.
/// 429 and 5xx retry with exponential backoff; other 4xx fail immediately.
struct FetchClient {
    http: reqwest::blocking::Client,
    source_name: String,
}

impl FetchClient {
    fn new(source_name: &str) -> Result<Self, CliError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CliError::io(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, source_name: source_name.to_string() })
    }

    fn get_with_retry(
        &self,
        build_request: impl Fn(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    ) -> Result<Value, CliError> {
        let mut backoff_secs = 1u64;

        for attempt in 0..=MAX_RETRIES {
            let result = build_request(&self.http).send();

            match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    // Non-retryable 4xx: fail immediately
                    if (400..500).contains(&status) && status != 429 {
                        return Err(CliError {
                            code: exit_codes::EXIT_FETCH_UPSTREAM,
                            message: format!(
                                "{} request rejected (HTTP {status})",
                                self.source_name,
                            ),
                            hint: None,
                        });
                    }

                    // Retryable: 429, 5xx
                    if status == 429 || status >= 500 {
                        if attempt == MAX_RETRIES {
                            let code = if status == 429 {
                                exit_codes::EXIT_FETCH_RATE_LIMIT
                            } else {
                                exit_codes::EXIT_FETCH_UPSTREAM
                            };
                            return Err(CliError {
                                code,
                                message: format!(
                                    "{} {} after {} attempts (HTTP {status})",
                                    self.source_name,
                                    if status == 429 { "rate limited" } else { "upstream error" },
                                    MAX_RETRIES,
                                ),
                                hint: None,
                            });
                        }

                        // Respect Retry-After for 429
                        let wait = if status == 429 {
                            resp.headers()
                                .get("retry-after")
                                .and_then(|v| v.to_str().ok())
                                .and_then(|v| v.parse::<u64>().ok())
                                .unwrap_or(backoff_secs)
                        } else {
                            backoff_secs
                        };

                        eprintln!(
                            "warning: retry {}/{} in {}s (HTTP {})",
                            attempt + 1,
                            MAX_RETRIES,
                            wait,
                            status,
                        );
                        thread::sleep(Duration::from_secs(wait));
                        backoff_secs *= 2;
                        continue;
                    }

                    return resp.json().map_err(|e| CliError {
                        code: exit_codes::EXIT_FETCH_UPSTREAM,
                        message: format!(
                            "failed to parse {} JSON response: {e}",
                            self.source_name,
                        ),
                        hint: None,
                    });
                }
                Err(e) => {
                    // Network/timeout errors: retry
                    if attempt == MAX_RETRIES {
                        return Err(CliError {
                            code: exit_codes::EXIT_FETCH_UPSTREAM,
                            message: format!(
                                "{} upstream error after {} attempts: {e}",
                                self.source_name, MAX_RETRIES,
                            ),
                            hint: None,
                        });
                    }

                    eprintln!(
                        "warning: retry {}/{} in {}s ({})",
                        attempt + 1,
                        MAX_RETRIES,
                        backoff_secs,
                        e,
                    );
                    thread::sleep(Duration::from_secs(backoff_secs));
                    backoff_secs *= 2;
                }
            }
        }

        unreachable!()
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn canned_page() -> Value {
        serde_json::json!({
            "data": [
                {
                    "type": "node--location",
                    "id": "loc-1",
                    "attributes": {
                        "title": "Worcester District Court",
                        "path": { "alias": "/locations/worcester-district-court" }
                    },
                    "relationships": {
                        "field_ref_contact_info": { "data": { "id": "contact-1" } },
                        "field_ref_contact_info_1": { "data": [ { "id": "contact-2" } ] }
                    }
                },
                {
                    "type": "node--location",
                    "id": "loc-2",
                    "attributes": {
                        "title": "Annex",
                        "path": { "alias": null }
                    },
                    "relationships": {}
                }
            ],
            "included": [
                {
                    "type": "node--contact_information",
                    "id": "contact-1",
                    "relationships": {
                        "field_ref_address": { "data": [ { "id": "addr-1" }, { "id": "addr-2" } ] }
                    }
                },
                {
                    "type": "node--contact_information",
                    "id": "contact-2",
                    "relationships": {
                        "field_ref_address": { "data": { "id": "addr-1" } }
                    }
                },
                {
                    "type": "paragraph--address",
                    "id": "addr-1",
                    "attributes": {
                        "field_address_address": {
                            "address_line1": "225 Main St",
                            "address_line2": "",
                            "locality": "Worcester",
                            "administrative_area": "MA",
                            "postal_code": "01608",
                            "country_code": "US"
                        }
                    }
                },
                {
                    "type": "paragraph--address",
                    "id": "addr-2",
                    "attributes": {
                        "field_address_address": {
                            "address_line1": "PO Box 100",
                            "locality": "WORCESTER",
                            "administrative_area": "MA",
                            "postal_code": "01608"
                        }
                    }
                }
            ],
            "links": {
                "next": { "href": "https://example.gov/jsonapi/node/location?page%5Boffset%5D=20" }
            }
        })
    }

    #[test]
    fn joins_addresses_through_contact_includes() {
        let (locations, has_next) = parse_page(&canned_page());
        assert!(has_next);
        assert_eq!(locations.len(), 2);

        let loc = &locations[0];
        assert_eq!(loc.title, "Worcester District Court");
        assert_eq!(loc.path_alias.as_deref(), Some("/locations/worcester-district-court"));
        // addr-1 referenced by both contacts, kept once
        assert_eq!(loc.addresses.len(), 2);
        assert_eq!(loc.addresses[0].line1, "225 Main St");
        assert_eq!(loc.addresses[1].line1, "PO Box 100");
        // city set is normalized, so the two spellings collapse
        assert_eq!(loc.cities.len(), 1);
        assert!(loc.cities.contains("worcester"));
    }

    #[test]
    fn location_without_contacts_has_no_addresses() {
        let (locations, _) = parse_page(&canned_page());
        let annex = &locations[1];
        assert!(annex.addresses.is_empty());
        assert!(annex.cities.is_empty());
        assert_eq!(annex.path_alias, None);
    }

    #[test]
    fn last_page_has_no_next_link() {
        let mut payload = canned_page();
        payload["links"] = serde_json::json!({ "self": { "href": "…" } });
        let (_, has_next) = parse_page(&payload);
        assert!(!has_next);
    }

    #[test]
    fn empty_payload_parses_to_nothing() {
        let (locations, has_next) = parse_page(&serde_json::json!({}));
        assert!(locations.is_empty());
        assert!(!has_next);
    }
}
