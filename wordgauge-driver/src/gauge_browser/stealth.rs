//! Anti-fingerprinting surface reduction.
//!
//! The design explicitly does not try to defeat the verification challenge
//! programmatically; it only avoids the cheap automation giveaways so a
//! valid cookie set (or a human operator) can do the rest.

/// Chrome command-line arguments applied at session construction.
pub fn chrome_arguments(headless: bool, window: (u32, u32)) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-gpu".to_string(),
        format!("--window-size={},{}", window.0, window.1),
    ];
    if headless {
        args.push("--headless=new".to_string());
    }
    args
}

/// JavaScript overrides applied after each navigation so navigator-level
/// properties report plausible human-browser values.
pub struct NavigatorOverrides;

impl NavigatorOverrides {
    pub fn script() -> &'static str {
        r#"
            Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
            Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
            Object.defineProperty(navigator, 'languages', {
                get: () => ['en-US', 'en']
            });
            Object.defineProperty(navigator, 'permissions', {
                get: () => ({
                    query: () => Promise.resolve({ state: 'granted' })
                })
            });
        "#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_flag_is_opt_in() {
        let headed = chrome_arguments(false, (1920, 1080));
        assert!(!headed.iter().any(|a| a.starts_with("--headless")));

        let headless = chrome_arguments(true, (1920, 1080));
        assert!(headless.contains(&"--headless=new".to_string()));
        assert!(headless.contains(&"--window-size=1920,1080".to_string()));
    }
}
