//! Prologue scanning: entity/DTD rejection and S1000D entity whitelisting.
//!
//! This runs before the byte buffer is ever handed to the underlying XML
//! tokenizer. `roxmltree` never fetches external resources for entities,
//! but it also has no notion of "this entity is fine, that one isn't" — so
//! the whole security boundary lives here: by the time `roxmltree` sees the
//! buffer, every entity declaration has either been validated and inlined
//! as plain text, or the whole document has already been rejected.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Extensions allowed for S1000D ICN entity system identifiers — this is
/// the observed safe set; widening it needs a deliberate security review,
/// not an ad hoc edit here.
const S1000D_ALLOWED_EXTENSIONS: &[&str] = &["cgm", "jpg", "jpeg", "png", "gif", "tif", "tiff"];

/// How many internal-entity chain hops to tolerate before treating a
/// document as an entity-expansion (billion-laughs) attack.
const MAX_ENTITY_CHAIN_DEPTH: usize = 4;
/// Combined substituted size (characters) beyond which we reject even a
/// chain that is individually below `MAX_ENTITY_CHAIN_DEPTH`.
const MAX_ENTITY_EXPANSION_CHARS: usize = 50_000;

static DOCTYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<!DOCTYPE\s+[A-Za-z_][\w.:-]*\s*(?P<extid>PUBLIC\s+"[^"]*"\s+"[^"]*"|PUBLIC\s+'[^']*'\s+'[^']*'|SYSTEM\s+"[^"]*"|SYSTEM\s+'[^']*')?\s*(?:\[(?P<internal>.*?)\])?\s*>"#,
    )
    .expect("static DOCTYPE regex is valid")
});

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<!ENTITY\s+(?P<param>%\s+)?(?P<name>[A-Za-z_][\w.-]*)\s+(?:SYSTEM\s+"(?P<sys_d>[^"]*)"|SYSTEM\s+'(?P<sys_s>[^']*)'|PUBLIC\s+"[^"]*"\s+"(?P<pub_d>[^"]*)"|PUBLIC\s+'[^']*'\s+'(?P<pub_s>[^']*)'|"(?P<val_d>[^"]*)"|'(?P<val_s>[^']*)')\s*>"#,
    )
    .expect("static ENTITY regex is valid")
});

static ENTITY_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&([A-Za-z_][\w.-]*);").expect("static entity-reference regex is valid")
});

static S1000D_HINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<\s*(dmodule|pm|dml|dmlist|pmc)[\s>/]|<\s*(idstatus|dmIdent)[\s>/]")
        .expect("static S1000D hint regex is valid")
});

#[derive(Debug, Clone)]
struct EntityDecl {
    name: String,
    is_parameter: bool,
    external_system_id: Option<String>,
    literal_value: Option<String>,
}

/// Result of sanitizing the prologue: the buffer with the DOCTYPE stripped
/// and any whitelisted entity references inlined, plus the extracted
/// S1000D entity metadata (empty if the document carried no whitelisted
/// entities).
pub struct Sanitized {
    pub bytes: Vec<u8>,
    /// Entity name -> system identifier, in declaration order.
    pub entity_metadata: Vec<(String, String)>,
}

/// Scan `bytes` for DTD/entity declarations, reject anything unsafe, and
/// return a sanitized buffer ready for the underlying parser.
pub fn sanitize(bytes: &[u8]) -> Result<Sanitized> {
    let text = std::str::from_utf8(bytes).map_err(|_| Error::Malformed {
        message: "document is not valid UTF-8 after encoding normalization".to_string(),
        at: None,
    })?;

    let Some(doctype) = DOCTYPE_RE.find(text) else {
        return Ok(Sanitized {
            bytes: bytes.to_vec(),
            entity_metadata: Vec::new(),
        });
    };

    let captures = DOCTYPE_RE
        .captures(text)
        .expect("DOCTYPE_RE.find already matched");

    if let Some(extid) = captures.name("extid") {
        if extid.as_str().starts_with("SYSTEM") || extid.as_str().starts_with("PUBLIC") {
            return Err(Error::SecurityRejected {
                reason: "external-dtd",
                detail: format!("external DOCTYPE subset: {}", extid.as_str()),
            });
        }
    }

    let internal = captures.name("internal").map(|m| m.as_str()).unwrap_or("");
    let is_s1000d = S1000D_HINT_RE.is_match(text);

    let decls = parse_entity_declarations(internal);
    let whitelisted = validate_entities(&decls, is_s1000d)?;

    let mut sanitized_text = String::with_capacity(text.len());
    sanitized_text.push_str(&text[..doctype.start()]);
    sanitized_text.push_str(&text[doctype.end()..]);

    let sanitized_text = inline_whitelisted_references(&sanitized_text, &whitelisted);

    Ok(Sanitized {
        bytes: sanitized_text.into_bytes(),
        entity_metadata: whitelisted,
    })
}

fn parse_entity_declarations(internal_subset: &str) -> Vec<EntityDecl> {
    ENTITY_RE
        .captures_iter(internal_subset)
        .map(|cap| {
            let name = cap["name"].to_string();
            let is_parameter = cap.name("param").is_some();
            let external_system_id = cap
                .name("sys_d")
                .or_else(|| cap.name("sys_s"))
                .or_else(|| cap.name("pub_d"))
                .or_else(|| cap.name("pub_s"))
                .map(|m| m.as_str().to_string());
            let literal_value = cap
                .name("val_d")
                .or_else(|| cap.name("val_s"))
                .map(|m| m.as_str().to_string());
            EntityDecl {
                name,
                is_parameter,
                external_system_id,
                literal_value,
            }
        })
        .collect()
}

fn validate_entities(decls: &[EntityDecl], is_s1000d: bool) -> Result<Vec<(String, String)>> {
    let mut whitelisted: Vec<(String, String)> = Vec::new();
    let by_name: HashMap<&str, &EntityDecl> =
        decls.iter().map(|d| (d.name.as_str(), d)).collect();

    for decl in decls {
        if let Some(system_id) = &decl.external_system_id {
            if decl.is_parameter {
                return Err(Error::SecurityRejected {
                    reason: "external-entity",
                    detail: format!("parameter entity %{} references {system_id}", decl.name),
                });
            }
            if is_s1000d && is_whitelisted_icn(&decl.name, system_id) {
                whitelisted.push((decl.name.clone(), system_id.clone()));
                continue;
            }
            if is_s1000d {
                return Err(Error::SecurityRejected {
                    reason: "entity-whitelist",
                    detail: format!(
                        "entity {} references {system_id}, which is not an S1000D-whitelisted ICN reference",
                        decl.name
                    ),
                });
            }
            return Err(Error::SecurityRejected {
                reason: "external-entity",
                detail: format!("entity {} references external resource {system_id}", decl.name),
            });
        }

        if let Some(value) = &decl.literal_value {
            check_expansion_budget(&decl.name, value, &by_name, &mut HashSet::new(), 0)?;
        }
    }

    Ok(whitelisted)
}

fn is_whitelisted_icn(name: &str, system_id: &str) -> bool {
    static ICN_NAME_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^ICN-[A-Z0-9-]+$").expect("static ICN regex is valid"));

    if !ICN_NAME_RE.is_match(name) {
        return false;
    }
    // A bare relative filename only — any URI scheme (http, https, ftp,
    // file, ...) means this is a network/filesystem lookup, not the local
    // media reference S1000D entities are meant to be.
    if system_id.contains("://") || system_id.starts_with('/') {
        return false;
    }
    let extension = system_id.rsplit('.').next().unwrap_or("").to_lowercase();
    S1000D_ALLOWED_EXTENSIONS.contains(&extension.as_str())
}

/// Recursively walk entity value references to bound both chain depth and
/// total substituted size, defending against billion-laughs-style nesting.
fn check_expansion_budget(
    root_name: &str,
    value: &str,
    by_name: &HashMap<&str, &EntityDecl>,
    visiting: &mut HashSet<String>,
    depth: usize,
) -> Result<usize> {
    if depth > MAX_ENTITY_CHAIN_DEPTH {
        return Err(Error::SecurityRejected {
            reason: "entity-expansion",
            detail: format!("entity {root_name} exceeds max nesting depth {MAX_ENTITY_CHAIN_DEPTH}"),
        });
    }
    if !visiting.insert(root_name.to_string()) {
        return Err(Error::SecurityRejected {
            reason: "entity-expansion",
            detail: format!("entity {root_name} is recursively self-referential"),
        });
    }

    let mut total = value.len();
    for cap in ENTITY_REF_RE.captures_iter(value) {
        let referenced = &cap[1];
        if let Some(decl) = by_name.get(referenced) {
            if let Some(nested_value) = &decl.literal_value {
                total += check_expansion_budget(referenced, nested_value, by_name, visiting, depth + 1)?;
            }
        }
        if total > MAX_ENTITY_EXPANSION_CHARS {
            return Err(Error::SecurityRejected {
                reason: "entity-expansion",
                detail: format!(
                    "entity {root_name} expansion exceeds {MAX_ENTITY_EXPANSION_CHARS} characters"
                ),
            });
        }
    }

    visiting.remove(root_name);
    Ok(total)
}

/// Replace `&Name;` in the document body with the bare entity name for
/// every whitelisted entity (names are restricted to `[A-Za-z0-9-]`, which
/// is already safe as XML text or attribute content without escaping).
fn inline_whitelisted_references(text: &str, whitelisted: &[(String, String)]) -> String {
    if whitelisted.is_empty() {
        return text.to_string();
    }
    ENTITY_REF_RE
        .replace_all(text, |cap: &regex::Captures| {
            let name = &cap[1];
            if whitelisted.iter().any(|(n, _)| n == name) {
                name.to_string()
            } else {
                cap[0].to_string()
            }
        })
        .into_owned()
}
