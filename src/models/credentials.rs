use secrecy::{ExposeSecret, Secret};

/// Portal login, held only for the duration of one request.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

/// Session cookie pair (`name=value`) issued by the portal after login.
#[derive(Debug)]
pub struct SessionToken(Secret<String>);

impl SessionToken {
    pub fn new(cookie_pair: String) -> Self {
        Self(Secret::new(cookie_pair))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_redacts_secrets() {
        let credentials = Credentials {
            username: "maria".to_string(),
            password: Secret::new("hunter2".to_string()),
        };
        let token = SessionToken::new("PHPSESSID=abc123".to_string());

        assert!(!format!("{:?}", credentials).contains("hunter2"));
        assert!(!format!("{:?}", token).contains("abc123"));
        assert_eq!(token.expose(), "PHPSESSID=abc123");
    }
}
