//! Pure hostname and URL derivation.
//!
//! A node's reachable URL is a deterministic function of its name, its
//! namespace, and the cluster's scheme/domain settings. Two addressing
//! modes exist: namespaced (`name.namespace.domain`) and flat
//! (`name.domain`, when the namespace segment is disabled). The debug
//! variant inserts a `-debug` suffix after the node name.

/// Derives a node's API URL.
#[must_use]
pub fn api_url(
    scheme: &str,
    name: &str,
    namespace: &str,
    domain: &str,
    disable_namespace: bool,
) -> String {
    format!(
        "{scheme}://{}",
        ingress_host(name, namespace, domain, disable_namespace)
    )
}

/// Derives a node's API ingress host.
#[must_use]
pub fn ingress_host(name: &str, namespace: &str, domain: &str, disable_namespace: bool) -> String {
    if disable_namespace {
        format!("{name}.{domain}")
    } else {
        format!("{name}.{namespace}.{domain}")
    }
}

/// Derives a node's debug API URL.
#[must_use]
pub fn debug_api_url(
    scheme: &str,
    name: &str,
    namespace: &str,
    domain: &str,
    disable_namespace: bool,
) -> String {
    format!(
        "{scheme}://{}",
        ingress_debug_host(name, namespace, domain, disable_namespace)
    )
}

/// Derives a node's debug API ingress host.
#[must_use]
pub fn ingress_debug_host(
    name: &str,
    namespace: &str,
    domain: &str,
    disable_namespace: bool,
) -> String {
    if disable_namespace {
        format!("{name}-debug.{domain}")
    } else {
        format!("{name}-debug.{namespace}.{domain}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_namespaced() {
        assert_eq!(
            api_url("https", "bee-0", "testnet", "example.com", false),
            "https://bee-0.testnet.example.com"
        );
    }

    #[test]
    fn test_api_url_flat() {
        assert_eq!(
            api_url("https", "bee-0", "testnet", "example.com", true),
            "https://bee-0.example.com"
        );
    }

    #[test]
    fn test_debug_api_url_namespaced() {
        assert_eq!(
            debug_api_url("https", "bee-0", "testnet", "example.com", false),
            "https://bee-0-debug.testnet.example.com"
        );
    }

    #[test]
    fn test_debug_api_url_flat() {
        assert_eq!(
            debug_api_url("http", "bee-0", "testnet", "example.com", true),
            "http://bee-0-debug.example.com"
        );
    }

    #[test]
    fn test_ingress_hosts_drop_scheme() {
        assert_eq!(
            ingress_host("bee-1", "testnet", "example.com", false),
            "bee-1.testnet.example.com"
        );
        assert_eq!(
            ingress_debug_host("bee-1", "testnet", "example.com", true),
            "bee-1-debug.example.com"
        );
    }
}
