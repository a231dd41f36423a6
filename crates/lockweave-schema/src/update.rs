use crate::package::LockedDependency;

/// Previously locked packages plus the names the caller wants re-solved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSpecification {
    pub locked: Vec<LockedDependency>,
    pub update: Vec<String>,
}

impl UpdateSpecification {
    pub fn new(locked: Option<Vec<LockedDependency>>, update: Option<Vec<String>>) -> Self {
        Self {
            locked: locked.unwrap_or_default(),
            update: update.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Manager;

    #[test]
    fn absent_fields_become_empty() {
        let spec = UpdateSpecification::new(None, None);
        assert!(spec.locked.is_empty());
        assert!(spec.update.is_empty());
        assert_eq!(spec, UpdateSpecification::default());
    }

    #[test]
    fn keeps_given_fields() {
        let locked = vec![LockedDependency::new("numpy", "1.26.0", Manager::Conda, "linux-64")];
        let spec = UpdateSpecification::new(Some(locked.clone()), Some(vec!["numpy".to_owned()]));
        assert_eq!(spec.locked, locked);
        assert_eq!(spec.update, vec!["numpy"]);
    }
}
