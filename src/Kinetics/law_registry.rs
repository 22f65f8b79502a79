//! Registry of rate-coefficient laws.
//!
//! Two partitions: the built-in laws (`Constant`, `Arrhenius`, `modArrhenius`) which can never
//! be replaced or removed, and the user laws which can be registered, unregistered and wiped
//! with [`LawRegistry::reset`]. A registry is an ordinary value: reactions and reaction systems
//! receive it by reference, so independent registries never interfere.
use crate::Kinetics::errors::KinError;
use crate::Kinetics::rate_laws::{
    Arrhenius, Constant, CustomLaw, CustomLawModel, LawParams, ModifiedArrhenius, RateLaw,
};
use log::{info, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// kind of law a name resolves to; turns coefficients into a bound [`RateLaw`]
#[derive(Clone)]
pub enum LawKind {
    Constant,
    Arrhenius,
    ModifiedArrhenius,
    Custom(Arc<dyn CustomLawModel>),
}

impl fmt::Debug for LawKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LawKind::Constant => write!(f, "Constant"),
            LawKind::Arrhenius => write!(f, "Arrhenius"),
            LawKind::ModifiedArrhenius => write!(f, "ModifiedArrhenius"),
            LawKind::Custom(model) => write!(f, "Custom({:?})", model),
        }
    }
}

impl PartialEq for LawKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LawKind::Constant, LawKind::Constant)
            | (LawKind::Arrhenius, LawKind::Arrhenius)
            | (LawKind::ModifiedArrhenius, LawKind::ModifiedArrhenius) => true,
            (LawKind::Custom(a), LawKind::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl LawKind {
    /// binds the law to `params` under the registry name `name`
    pub fn instantiate(
        &self,
        name: &str,
        params: &LawParams,
        check: bool,
    ) -> Result<RateLaw, KinError> {
        let law = match self {
            LawKind::Constant => RateLaw::Constant(Constant::from_params(params, check)?),
            LawKind::Arrhenius => RateLaw::Arrhenius(Arrhenius::from_params(params, check)?),
            LawKind::ModifiedArrhenius => {
                RateLaw::ModifiedArrhenius(ModifiedArrhenius::from_params(params, check)?)
            }
            LawKind::Custom(model) => {
                RateLaw::Custom(CustomLaw::from_params(name, model.clone(), params, check)?)
            }
        };
        Ok(law)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LawRegistry {
    builtin: BTreeMap<String, LawKind>,
    user: BTreeMap<String, LawKind>,
}

impl Default for LawRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LawRegistry {
    pub fn new() -> Self {
        let builtin = BTreeMap::from([
            ("Constant".to_string(), LawKind::Constant),
            ("Arrhenius".to_string(), LawKind::Arrhenius),
            ("modArrhenius".to_string(), LawKind::ModifiedArrhenius),
        ]);
        Self {
            builtin,
            user: BTreeMap::new(),
        }
    }
    /// built-in laws plus the lowercase/snake_case aliases, all protected
    pub fn with_aliases() -> Self {
        let mut registry = Self::new();
        for (alias, kind) in [
            ("constant", LawKind::Constant),
            ("arrhenius", LawKind::Arrhenius),
            ("modified_arrhenius", LawKind::ModifiedArrhenius),
            ("ModifiedArrhenius", LawKind::ModifiedArrhenius),
        ] {
            registry.builtin.insert(alias.to_string(), kind);
        }
        registry
    }

    pub fn get(&self, name: &str) -> Result<&LawKind, KinError> {
        self.builtin
            .get(name)
            .or_else(|| self.user.get(name))
            .ok_or_else(|| KinError::NotFound(format!("LawName = {} is not registered.", name)))
    }
    pub fn contains(&self, name: &str) -> bool {
        self.builtin.contains_key(name) || self.user.contains_key(name)
    }
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtin.contains_key(name)
    }
    /// every visible law; built-in names win on clash (they cannot clash, see `register`)
    pub fn get_all(&self) -> BTreeMap<String, LawKind> {
        let mut all = self.user.clone();
        all.extend(self.builtin.iter().map(|(k, v)| (k.clone(), v.clone())));
        all
    }
    pub fn get_builtin(&self) -> BTreeMap<String, LawKind> {
        self.builtin.clone()
    }
    pub fn get_user(&self) -> BTreeMap<String, LawKind> {
        self.user.clone()
    }
    pub fn names(&self) -> Vec<String> {
        self.get_all().into_keys().collect()
    }

    fn check_not_builtin(&self, name: &str) -> Result<(), KinError> {
        if self.builtin.contains_key(name) {
            return Err(KinError::ProtectedKey(name.to_string()));
        }
        Ok(())
    }

    /// adds or replaces a user law
    pub fn register(&mut self, name: &str, kind: LawKind) -> Result<(), KinError> {
        self.check_not_builtin(name)?;
        if self.user.insert(name.to_string(), kind).is_some() {
            warn!("user law '{}' replaced", name);
        } else {
            info!("user law '{}' registered", name);
        }
        Ok(())
    }
    /// all-or-nothing: if any name is protected nothing is registered
    pub fn register_many(
        &mut self,
        laws: impl IntoIterator<Item = (String, LawKind)>,
    ) -> Result<(), KinError> {
        let laws: Vec<(String, LawKind)> = laws.into_iter().collect();
        for (name, _) in &laws {
            self.check_not_builtin(name)?;
        }
        for (name, kind) in laws {
            self.register(&name, kind)?;
        }
        Ok(())
    }
    pub fn unregister(&mut self, name: &str) -> Result<LawKind, KinError> {
        self.check_not_builtin(name)?;
        let kind = self.user.remove(name).ok_or_else(|| {
            KinError::NotFound(format!("LawName = {} is not a registered user law.", name))
        })?;
        info!("user law '{}' unregistered", name);
        Ok(kind)
    }
    /// drops all user laws, built-in ones are kept
    pub fn reset(&mut self) {
        if !self.user.is_empty() {
            info!("{} user law(s) removed from registry", self.user.len());
        }
        self.user.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::rate_laws::{RateLawModel, RateState};
    use approx::assert_relative_eq;

    #[derive(Debug)]
    struct Doubling;
    impl CustomLawModel for Doubling {
        fn kernel(&self, params: &LawParams, _state: &RateState) -> f64 {
            2.0 * params.get("k").copied().unwrap_or(1.0)
        }
    }

    #[test]
    fn test_builtin_names() {
        let registry = LawRegistry::new();
        assert_eq!(
            registry.names(),
            vec!["Arrhenius".to_string(), "Constant".to_string(), "modArrhenius".to_string()]
        );
        assert!(registry.get_user().is_empty());
        assert!(matches!(registry.get("Unknown"), Err(KinError::NotFound(_))));
    }

    #[test]
    fn test_builtin_laws_are_protected() {
        let mut registry = LawRegistry::new();
        let before = registry.clone();
        for name in ["Constant", "Arrhenius", "modArrhenius"] {
            let err = registry.register(name, LawKind::Constant).unwrap_err();
            assert_eq!(err, KinError::ProtectedKey(name.to_string()));
            assert!(matches!(
                registry.unregister(name),
                Err(KinError::ProtectedKey(_))
            ));
        }
        assert_eq!(registry, before);
        assert_eq!(registry.get("Arrhenius").unwrap(), &LawKind::Arrhenius);
    }

    #[test]
    fn test_register_many_is_atomic() {
        let mut registry = LawRegistry::new();
        let result = registry.register_many(vec![
            ("mine".to_string(), LawKind::Custom(Arc::new(Doubling))),
            ("Constant".to_string(), LawKind::Arrhenius),
        ]);
        assert!(matches!(result, Err(KinError::ProtectedKey(_))));
        assert!(!registry.contains("mine"));
        registry
            .register_many(vec![
                ("mine".to_string(), LawKind::Custom(Arc::new(Doubling))),
                ("alias".to_string(), LawKind::Arrhenius),
            ])
            .unwrap();
        assert_eq!(registry.get_user().len(), 2);
    }

    #[test]
    fn test_reset_restores_builtins() {
        let mut registry = LawRegistry::new();
        registry
            .register("mine", LawKind::Custom(Arc::new(Doubling)))
            .unwrap();
        assert!(registry.contains("mine"));
        registry.reset();
        assert!(!registry.contains("mine"));
        assert_eq!(registry.get_all(), registry.get_builtin());
        assert_eq!(registry, LawRegistry::new());
    }

    #[test]
    fn test_unregister() {
        let mut registry = LawRegistry::new();
        registry.register("mine", LawKind::Arrhenius).unwrap();
        assert_eq!(registry.unregister("mine").unwrap(), LawKind::Arrhenius);
        assert!(matches!(
            registry.unregister("mine"),
            Err(KinError::NotFound(_))
        ));
    }

    #[test]
    fn test_aliases() {
        let mut registry = LawRegistry::with_aliases();
        assert_eq!(
            registry.get("modified_arrhenius").unwrap(),
            &LawKind::ModifiedArrhenius
        );
        assert!(registry.register("arrhenius", LawKind::Constant).is_err());
        assert!(!LawRegistry::new().contains("arrhenius"));
    }

    #[test]
    fn test_instantiate_user_law() {
        let mut registry = LawRegistry::new();
        registry
            .register("double", LawKind::Custom(Arc::new(Doubling)))
            .unwrap();
        let params = LawParams::from([("k".to_string(), 3.0)]);
        let law = registry
            .get("double")
            .unwrap()
            .instantiate("double", &params, true)
            .unwrap();
        assert_eq!(law.name(), "double");
        assert_relative_eq!(law.compute(&RateState::default(), true).unwrap(), 6.0);
    }
}
