//! Component signatures: fixed-width bitsets over component-type indices.
//!
//! Every component type is given a bit the first time a signature sets it.
//! The assignment lives in a [`ComponentTypes`] table that callers own and
//! pass in, so two worlds never share bit layouts by accident.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::ops::{BitAnd, BitOr};

use super::set::ComponentSet;
use super::Component;

const WORD_BITS: usize = u64::BITS as usize;
const WORDS: usize = 4;

/// Identity of one component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
}

impl ComponentType {
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Append-only table mapping component types to signature bits.
#[derive(Debug, Clone)]
pub struct ComponentTypes {
    indices: HashMap<TypeId, usize>,
    names: Vec<&'static str>,
    capacity: usize,
}

impl ComponentTypes {
    /// Creates a table that hands out at most `max_components` bits.
    ///
    /// The capacity is clamped to [`Signature::BITS`].
    pub fn new(max_components: usize) -> Self {
        Self {
            indices: HashMap::new(),
            names: Vec::new(),
            capacity: max_components.min(Signature::BITS),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn is_saturated(&self) -> bool {
        self.names.len() >= self.capacity
    }

    pub fn index_of<T: Component>(&self) -> Option<usize> {
        self.lookup(ComponentType::of::<T>())
    }

    pub fn assign<T: Component>(&mut self) -> Option<usize> {
        self.assign_type(ComponentType::of::<T>())
    }

    pub fn lookup(&self, ty: ComponentType) -> Option<usize> {
        self.indices.get(&ty.id).copied()
    }

    /// Returns the bit for `ty`, assigning the next free one on first use.
    ///
    /// Returns `None` once the table is full; the mapping of already
    /// assigned types is unaffected.
    pub fn assign_type(&mut self, ty: ComponentType) -> Option<usize> {
        if let Some(index) = self.lookup(ty) {
            return Some(index);
        }
        if self.is_saturated() {
            tracing::warn!(
                component = ty.name,
                capacity = self.capacity,
                "component type table is full"
            );
            return None;
        }
        let index = self.names.len();
        self.indices.insert(ty.id, index);
        self.names.push(ty.name);
        tracing::trace!(component = ty.name, index, "assigned signature bit");
        Some(index)
    }

    /// Assigns bits to every type in `tys`, or to none of them.
    ///
    /// On failure returns the first type that would not fit; the table is
    /// left as it was.
    pub fn assign_all(&mut self, tys: &[ComponentType]) -> Result<(), ComponentType> {
        let mut pending: Vec<ComponentType> = Vec::new();
        for ty in tys {
            if self.lookup(*ty).is_none() && !pending.contains(ty) {
                pending.push(*ty);
            }
        }
        let room = self.capacity.saturating_sub(self.names.len());
        if let Some(overflow) = pending.get(room) {
            tracing::warn!(
                component = overflow.name,
                capacity = self.capacity,
                "component type table is full"
            );
            return Err(*overflow);
        }
        for ty in pending {
            self.assign_type(ty);
        }
        Ok(())
    }

    pub fn name_of(&self, index: usize) -> Option<&'static str> {
        self.names.get(index).copied()
    }
}

impl Default for ComponentTypes {
    fn default() -> Self {
        Self::new(Signature::BITS)
    }
}

/// Set of component types, stored as a bitset.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    words: [u64; WORDS],
}

impl Signature {
    /// Hard ceiling on the number of distinct component types.
    pub const BITS: usize = WORD_BITS * WORDS;

    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets the bit of every type in `S`, assigning bits on first use.
    ///
    /// Returns `false` if at least one type could not get a bit because the
    /// table is full. Bits that could be assigned are still set.
    pub fn set<S: ComponentSet>(&mut self, types: &mut ComponentTypes) -> bool {
        let mut complete = true;
        for ty in S::component_types() {
            match types.assign_type(ty) {
                Some(index) => self.set_bit(index),
                None => complete = false,
            }
        }
        complete
    }

    /// Clears the bit of every type in `S` that has one.
    pub fn unset<S: ComponentSet>(&mut self, types: &ComponentTypes) {
        for ty in S::component_types() {
            if let Some(index) = types.lookup(ty) {
                self.unset_bit(index);
            }
        }
    }

    /// Builds the signature of `S` without assigning new bits.
    ///
    /// Returns `None` when some type in `S` has never been given a bit,
    /// since no stored signature can contain it.
    pub fn of<S: ComponentSet>(types: &ComponentTypes) -> Option<Self> {
        let mut signature = Self::empty();
        for ty in S::component_types() {
            signature.set_bit(types.lookup(ty)?);
        }
        Some(signature)
    }

    pub fn set_bit(&mut self, index: usize) {
        if index < Self::BITS {
            self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
        }
    }

    pub fn unset_bit(&mut self, index: usize) {
        if index < Self::BITS {
            self.words[index / WORD_BITS] &= !(1u64 << (index % WORD_BITS));
        }
    }

    pub fn test(&self, index: usize) -> bool {
        index < Self::BITS && (self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS))) != 0
    }

    /// Superset test: every bit of `other` is also set in `self`.
    pub fn contains(&self, other: &Signature) -> bool {
        (*self & *other) == *other
    }

    pub fn reset(&mut self) {
        self.words = [0; WORDS];
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    /// Number of set bits.
    pub fn len(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Set bit indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..Self::BITS).filter(move |index| self.test(*index))
    }
}

impl BitAnd for Signature {
    type Output = Signature;

    fn bitand(self, rhs: Self) -> Self::Output {
        let mut words = self.words;
        for (word, other) in words.iter_mut().zip(rhs.words) {
            *word &= other;
        }
        Signature { words }
    }
}

impl BitOr for Signature {
    type Output = Signature;

    fn bitor(self, rhs: Self) -> Self::Output {
        let mut words = self.words;
        for (word, other) in words.iter_mut().zip(rhs.words) {
            *word |= other;
        }
        Signature { words }
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
