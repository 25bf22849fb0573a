use std::sync::OnceLock;

type Resolver = Box<dyn Fn() -> String + Send + Sync>;

/// Display name resolved on first access and cached afterwards.
pub struct LazyName {
    cell: OnceLock<String>,
    resolve: Resolver,
}

impl LazyName {
    pub fn new(resolve: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self {
            cell: OnceLock::new(),
            resolve: Box::new(resolve),
        }
    }

    /// Name taken from the last path segment of `T`'s type name.
    pub fn of_type<T: ?Sized + 'static>() -> Self {
        Self::new(|| short_type_name(std::any::type_name::<T>()).to_string())
    }

    pub fn get(&self) -> &str {
        self.cell.get_or_init(|| (self.resolve)())
    }

    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl std::fmt::Debug for LazyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyName")
            .field("resolved", &self.cell.get())
            .finish()
    }
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Probe;

    #[test]
    fn test_resolves_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let name = LazyName::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "Expensive".to_string()
        });

        assert!(!name.is_resolved());
        assert_eq!(name.get(), "Expensive");
        assert_eq!(name.get(), "Expensive");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(name.is_resolved());
    }

    #[test]
    fn test_of_type_uses_short_name() {
        assert_eq!(LazyName::of_type::<Probe>().get(), "Probe");
        assert_eq!(short_type_name("a::b::Outer<c::Inner>"), "Outer");
    }
}
