use crate::entry::recorder_name;

/// Display-name identity. No credentials are checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<String>,
}

impl Session {
    pub fn new(user: Option<String>) -> Self {
        let mut session = Self::default();
        if let Some(name) = user {
            session.login(&name);
        }
        session
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Returns false and keeps the current identity when `name` is blank.
    pub fn login(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.user = Some(name.to_string());
        true
    }

    pub fn logout(&mut self) {
        self.user = None;
    }

    pub fn recorder(&self) -> String {
        recorder_name(self.user())
    }
}
