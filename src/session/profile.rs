// src/session/profile.rs — Display name, avatar and sidebar flag

use super::storage::{KeyValueStorage, SIDEBAR_COLLAPSED_KEY, USERNAME_KEY, USER_IMAGE_KEY};
use crate::infra::errors::ChatError;

pub const DEFAULT_DISPLAY_NAME: &str = "User";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub display_name: String,
    pub avatar: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            display_name: DEFAULT_DISPLAY_NAME.into(),
            avatar: None,
        }
    }
}

impl Profile {
    pub fn load(storage: &dyn KeyValueStorage) -> Self {
        let display_name = storage
            .get(USERNAME_KEY)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.into());
        let avatar = storage.get(USER_IMAGE_KEY).filter(|a| !a.trim().is_empty());
        Self {
            display_name,
            avatar,
        }
    }

    pub fn set_avatar(
        &mut self,
        storage: &mut dyn KeyValueStorage,
        avatar: Option<String>,
    ) -> Result<(), ChatError> {
        match &avatar {
            Some(uri) => storage.set(USER_IMAGE_KEY, uri.clone())?,
            None => storage.remove(USER_IMAGE_KEY)?,
        }
        self.avatar = avatar;
        Ok(())
    }
}

pub fn sidebar_collapsed(storage: &dyn KeyValueStorage) -> bool {
    storage.get(SIDEBAR_COLLAPSED_KEY).as_deref() == Some("1")
}

pub fn set_sidebar_collapsed(
    storage: &mut dyn KeyValueStorage,
    collapsed: bool,
) -> Result<(), ChatError> {
    if collapsed {
        storage.set(SIDEBAR_COLLAPSED_KEY, "1".into())
    } else {
        storage.remove(SIDEBAR_COLLAPSED_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStorage;

    #[test]
    fn test_defaults_when_empty() {
        let storage = MemoryStorage::new();
        let p = Profile::load(&storage);
        assert_eq!(p, Profile::default());
        assert!(!sidebar_collapsed(&storage));
    }

    #[test]
    fn test_blank_name_falls_back() {
        let mut storage = MemoryStorage::new();
        storage.set(USERNAME_KEY, "   ".into()).unwrap();
        assert_eq!(Profile::load(&storage).display_name, "User");
    }

    #[test]
    fn test_avatar_set_and_clear() {
        let mut storage = MemoryStorage::new();
        let mut p = Profile::load(&storage);
        p.set_avatar(&mut storage, Some("data:image/png;base64,AAAA".into()))
            .unwrap();
        assert_eq!(
            Profile::load(&storage).avatar.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
        p.set_avatar(&mut storage, None).unwrap();
        assert!(Profile::load(&storage).avatar.is_none());
    }

    #[test]
    fn test_sidebar_flag_toggle() {
        let mut storage = MemoryStorage::new();
        set_sidebar_collapsed(&mut storage, true).unwrap();
        assert!(sidebar_collapsed(&storage));
        set_sidebar_collapsed(&mut storage, false).unwrap();
        assert!(!sidebar_collapsed(&storage));
    }
}
