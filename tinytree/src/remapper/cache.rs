use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use indexmap::IndexMap;
use log::trace;
use parking_lot::Mutex;
use crate::metadata::Namespace;
use crate::remapper::SimpleRemapper;
use crate::tree::mappings::Mappings;

/// Keeps the [`SimpleRemapper`]s of a mapping tree, one for each pair of namespaces asked for.
///
/// Each tree owns its cache. Remappers are only ever built from that tree, through [`Mappings::remapper`].
///
/// A remapper is built on the first request for its pair and kept until [`RemapperCache::clear`] is called.
/// Nothing is ever evicted otherwise.
///
/// Building happens without holding the lock, so two threads missing on the same pair at once may both build a
/// remapper. The first one to be inserted is kept, and handed out to both.
#[derive(Default)]
pub struct RemapperCache {
	remappers: Mutex<IndexMap<(Namespace, Namespace), Arc<SimpleRemapper>>>,
}

impl RemapperCache {
	pub(crate) fn get_or_create(&self, mappings: &Mappings, from: Namespace, to: Namespace) -> Arc<SimpleRemapper> {
		if let Some(remapper) = self.remappers.lock().get(&(from, to)) {
			return Arc::clone(remapper);
		}

		trace!("creating remapper from {from:?} to {to:?}");
		let remapper = Arc::new(SimpleRemapper::new(mappings, from, to));

		let mut remappers = self.remappers.lock();
		Arc::clone(remappers.entry((from, to)).or_insert(remapper))
	}

	/// The number of remappers currently kept.
	pub fn len(&self) -> usize {
		self.remappers.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.remappers.lock().is_empty()
	}

	/// Drops all remappers. Ones already handed out stay valid.
	pub fn clear(&self) {
		self.remappers.lock().clear();
	}
}

impl Debug for RemapperCache {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RemapperCache")
			.field("len", &self.len())
			.finish()
	}
}

impl Mappings {
	/// The cache of remappers of these mappings.
	pub fn remapper_cache(&self) -> &RemapperCache {
		&self.remappers
	}
}

#[cfg(test)]
mod testing {
	use std::sync::Arc;
	use pretty_assertions::assert_eq;
	use crate::metadata::{Metadata, Namespace, Namespaces};
	use crate::tree::mappings::{ClassMapping, Mappings};
	use crate::tree::names::Names;
	use crate::remapper::ClassRemapper;

	fn mappings() -> anyhow::Result<Mappings> {
		let metadata = Metadata {
			major_version: 2,
			minor_version: 0,
			namespaces: Namespaces::try_from(vec!["a".to_owned(), "b".to_owned()])?,
			..Metadata::default()
		};
		let mut mappings = Mappings::new(metadata);
		mappings.classes.insert("x".to_owned(), ClassMapping::new(Names::from(["x", "Y"])));
		Ok(mappings)
	}

	#[test]
	fn same_pair_same_remapper() -> anyhow::Result<()> {
		let mappings = mappings()?;
		let cache = mappings.remapper_cache();
		assert!(cache.is_empty());

		let first = cache.get_or_create(&mappings, Namespace(0), Namespace(1));
		let second = cache.get_or_create(&mappings, Namespace(0), Namespace(1));
		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(cache.len(), 1);

		let back = cache.get_or_create(&mappings, Namespace(1), Namespace(0));
		assert!(!Arc::ptr_eq(&first, &back));
		assert_eq!(cache.len(), 2);

		assert_eq!(first.map_class("x"), "Y");
		assert_eq!(back.map_class("Y"), "x");
		Ok(())
	}

	#[test]
	fn clear_drops_everything() -> anyhow::Result<()> {
		let mappings = mappings()?;
		let cache = mappings.remapper_cache();

		let before = cache.get_or_create(&mappings, Namespace(0), Namespace(1));
		cache.clear();
		assert_eq!(cache.len(), 0);

		let after = cache.get_or_create(&mappings, Namespace(0), Namespace(1));
		assert!(!Arc::ptr_eq(&before, &after));
		assert_eq!(before.map_class("x"), after.map_class("x"));
		Ok(())
	}

	#[test]
	fn cloned_mappings_start_empty() -> anyhow::Result<()> {
		let mappings = mappings()?;
		mappings.remapper_between(Namespace(0), Namespace(1));

		let cloned = mappings.clone();
		assert_eq!(mappings.remapper_cache().len(), 1);
		assert!(cloned.remapper_cache().is_empty());
		Ok(())
	}
}
