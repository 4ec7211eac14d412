use std::sync::Arc;

/// Single-slot memo: keeps the last computed value together with the key it
/// was computed for.
#[derive(Debug)]
pub struct Memo<K, V> {
    slot: Option<(K, Arc<V>)>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<K: PartialEq + std::fmt::Debug, V> Memo<K, V> {
    /// Return the cached value for `key`, or compute and store it.
    /// Failures are not cached.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some((cached_key, value)) = &self.slot {
            if *cached_key == key {
                log::debug!("memo hit for {key:?}");
                return Ok(Arc::clone(value));
            }
        }

        log::debug!("memo miss for {key:?}");
        let value = Arc::new(compute()?);
        self.slot = Some((key, Arc::clone(&value)));
        Ok(value)
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recomputes_only_when_key_changes() {
        let mut memo: Memo<(u64, String), usize> = Memo::default();
        let mut calls = 0;

        for _ in 0..3 {
            let v = memo
                .get_or_try_insert_with::<()>((1, "a".into()), || {
                    calls += 1;
                    Ok(42)
                })
                .expect("value");
            assert_eq!(*v, 42);
        }
        assert_eq!(calls, 1);

        memo.get_or_try_insert_with::<()>((2, "a".into()), || {
            calls += 1;
            Ok(7)
        })
        .expect("value");
        assert_eq!(calls, 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let mut memo: Memo<u8, u8> = Memo::default();
        assert!(memo.get_or_try_insert_with(1, || Err("boom")).is_err());
        assert_eq!(*memo.get_or_try_insert_with::<&str>(1, || Ok(5)).expect("value"), 5);

        memo.clear();
        assert_eq!(*memo.get_or_try_insert_with::<&str>(1, || Ok(6)).expect("value"), 6);
    }
}
