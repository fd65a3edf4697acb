//! Maps an inbound `Host` header onto the canonical domain a project is routed by.

/// Normalized project identity derived from a host name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalDomain {
    /// `<label>.<root>`: a project subdomain of the platform.
    Subdomain { label: String, fqdn: String },
    /// Any other host. Only usable once a verified custom domain backs it,
    /// which the lookup checks.
    Custom(String),
}

impl CanonicalDomain {
    /// The fully-qualified host, as stored on links.
    pub fn as_str(&self) -> &str {
        match self {
            CanonicalDomain::Subdomain { fqdn, .. } => fqdn,
            CanonicalDomain::Custom(host) => host,
        }
    }
}

impl std::fmt::Display for CanonicalDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct DomainResolver {
    root_domain: String,
    suffix: String,
}

impl DomainResolver {
    pub fn new(root_domain: impl Into<String>) -> Self {
        let root_domain = root_domain.into().to_ascii_lowercase();
        let suffix = format!(".{}", root_domain);
        Self {
            root_domain,
            suffix,
        }
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    /// Resolves a raw `Host` header value.
    ///
    /// - `foo.<root>` (any case, optional port) → `Subdomain { label: "foo", .. }`
    /// - `a.b.<root>` → `Subdomain { label: "a", fqdn: "a.<root>" }`
    /// - `<root>` or a leading `www` label → `None`
    /// - any other well-formed host name → `Custom(host)`
    /// - missing, IP-literal or malformed hosts → `None`
    pub fn resolve(&self, host: Option<&str>) -> Option<CanonicalDomain> {
        let host = normalize_host(host?)?;

        if host == self.root_domain {
            return None;
        }

        if let Some(prefix) = host.strip_suffix(&self.suffix) {
            let label = prefix.split('.').next().unwrap_or(prefix);
            if label.is_empty() || label == "www" {
                return None;
            }
            return Some(CanonicalDomain::Subdomain {
                label: label.to_string(),
                fqdn: format!("{}{}", label, self.suffix),
            });
        }

        if !host.contains('.') || host.parse::<std::net::Ipv4Addr>().is_ok() {
            return None;
        }

        Some(CanonicalDomain::Custom(host))
    }

    /// Maps a caller-supplied project identity (`foo`, `foo.<root>` or a
    /// custom host) to the key stored on the project row.
    pub fn project_key(&self, input: &str) -> String {
        let input = input.trim().trim_end_matches('.').to_ascii_lowercase();
        match input.strip_suffix(&self.suffix) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => input,
        }
    }

    /// True if `label` is acceptable as a project subdomain.
    pub fn is_valid_label(label: &str) -> bool {
        label != "www" && is_valid_label(label)
    }
}

/// Strips the port and trailing dot, lowercases and checks every label.
fn normalize_host(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('[') {
        return None;
    }

    let host = match raw.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        Some(_) => return None,
        None => raw,
    };

    let host = host.strip_suffix('.').unwrap_or(host).to_ascii_lowercase();

    if host.is_empty() || host.len() > 253 || !host.split('.').all(is_valid_label) {
        return None;
    }

    Some(host)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
