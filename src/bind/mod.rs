//! Binding configuration values into annotated structures.
//!
//! A structure opts in by implementing [`Configurable`] and registering each of
//! its fields together with an annotation string:
//!
//! ```
//! use std::time::Duration;
//! use dragon_config::{Configurable, Fields};
//!
//! #[derive(Default)]
//! struct Database {
//!     dsn: String,
//!     password: String,
//!     timeout: Duration,
//! }
//!
//! impl Configurable for Database {
//!     fn fields<'a>(&'a mut self, fields: &mut Fields<'a>) {
//!         fields
//!             .field("dsn,required", &mut self.dsn)
//!             .field("password,required,secret", &mut self.password)
//!             .field("timeout", &mut self.timeout);
//!     }
//! }
//! ```
//!
//! The annotation is `<key>[,required][,secret]`. A key of `-` or an empty key
//! leaves the field unbound.

mod descriptor;
pub(crate) mod engine;
mod resolve;

use std::time::Duration;

use crate::BoxError;

pub use descriptor::{FieldDescriptor, SourceClass};

/// A structure whose fields can be populated by a [`Manager`](crate::Manager).
pub trait Configurable {
    /// Registers the bindable fields of this structure in declaration order.
    fn fields<'a>(&'a mut self, fields: &mut Fields<'a>);

    /// Returns the validation hook of this structure, if it has one.
    ///
    /// Implementors of [`Validate`] override this with `Some(self)`.
    fn validator(&self) -> Option<&dyn Validate> {
        None
    }
}

/// Structure-level validation, run once all fields of the structure are bound.
pub trait Validate {
    fn validate(&self) -> Result<(), BoxError>;
}

/// Closed set of field types the engine knows how to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Int64,
    Uint,
    Uint64,
    Float,
    Bool,
    Duration,
    StringSlice,
    IntSlice,
    Int64Slice,
    UintSlice,
    Uint64Slice,
    FloatSlice,
    BoolSlice,
    Struct,
    StructSlice,
}

/// Mutable handle to one bindable field.
pub enum Slot<'a> {
    String(&'a mut String),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    Isize(&'a mut isize),
    I64(&'a mut i64),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    Usize(&'a mut usize),
    U64(&'a mut u64),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Bool(&'a mut bool),
    Duration(&'a mut Duration),
    StringSlice(&'a mut Vec<String>),
    IntSlice(&'a mut Vec<isize>),
    Int64Slice(&'a mut Vec<i64>),
    UintSlice(&'a mut Vec<usize>),
    Uint64Slice(&'a mut Vec<u64>),
    FloatSlice(&'a mut Vec<f64>),
    BoolSlice(&'a mut Vec<bool>),
    I8Slice(&'a mut Vec<i8>),
    I16Slice(&'a mut Vec<i16>),
    I32Slice(&'a mut Vec<i32>),
    U8Slice(&'a mut Vec<u8>),
    U16Slice(&'a mut Vec<u16>),
    U32Slice(&'a mut Vec<u32>),
    F32Slice(&'a mut Vec<f32>),
    Struct(&'a mut dyn Configurable),
    StructSlice(Vec<&'a mut dyn Configurable>),
}

impl Slot<'_> {
    /// Returns the accessor family used to read this field.
    pub fn kind(&self) -> FieldKind {
        match self {
            Slot::String(_) => FieldKind::String,
            Slot::I8(_) | Slot::I16(_) | Slot::I32(_) | Slot::Isize(_) => FieldKind::Int,
            Slot::I64(_) => FieldKind::Int64,
            Slot::U8(_) | Slot::U16(_) | Slot::U32(_) | Slot::Usize(_) => FieldKind::Uint,
            Slot::U64(_) => FieldKind::Uint64,
            Slot::F32(_) | Slot::F64(_) => FieldKind::Float,
            Slot::Bool(_) => FieldKind::Bool,
            Slot::Duration(_) => FieldKind::Duration,
            Slot::StringSlice(_) => FieldKind::StringSlice,
            Slot::I8Slice(_) | Slot::I16Slice(_) | Slot::I32Slice(_) | Slot::IntSlice(_) => {
                FieldKind::IntSlice
            }
            Slot::Int64Slice(_) => FieldKind::Int64Slice,
            Slot::U8Slice(_) | Slot::U16Slice(_) | Slot::U32Slice(_) | Slot::UintSlice(_) => {
                FieldKind::UintSlice
            }
            Slot::Uint64Slice(_) => FieldKind::Uint64Slice,
            Slot::F32Slice(_) | Slot::FloatSlice(_) => FieldKind::FloatSlice,
            Slot::BoolSlice(_) => FieldKind::BoolSlice,
            Slot::Struct(_) => FieldKind::Struct,
            Slot::StructSlice(_) => FieldKind::StructSlice,
        }
    }
}

/// A primitive or sequence type that can be the target of a binding.
pub trait Bindable {
    fn slot(&mut self) -> Slot<'_>;
}

macro_rules! impl_bindable {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Bindable for $ty {
                fn slot(&mut self) -> Slot<'_> {
                    Slot::$variant(self)
                }
            }
        )*
    };
}

impl_bindable! {
    String => String,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    isize => Isize,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    usize => Usize,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    Duration => Duration,
    Vec<String> => StringSlice,
    Vec<isize> => IntSlice,
    Vec<i64> => Int64Slice,
    Vec<usize> => UintSlice,
    Vec<u64> => Uint64Slice,
    Vec<f64> => FloatSlice,
    Vec<bool> => BoolSlice,
    Vec<i8> => I8Slice,
    Vec<i16> => I16Slice,
    Vec<i32> => I32Slice,
    Vec<u8> => U8Slice,
    Vec<u16> => U16Slice,
    Vec<u32> => U32Slice,
    Vec<f32> => F32Slice,
}

pub(crate) struct Field<'a> {
    pub(crate) descriptor: FieldDescriptor,
    pub(crate) slot: Slot<'a>,
}

/// Binding table of one structure, filled by [`Configurable::fields`].
#[derive(Default)]
pub struct Fields<'a> {
    entries: Vec<Field<'a>>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a primitive or sequence field.
    pub fn field<T: Bindable>(&mut self, tag: &str, target: &'a mut T) -> &mut Self {
        self.push(tag, target.slot())
    }

    /// Registers a nested structure. Its keys are prefixed with this field's key.
    pub fn nested<T: Configurable>(&mut self, tag: &str, target: &'a mut T) -> &mut Self {
        self.push(tag, Slot::Struct(target))
    }

    /// Registers a sequence of nested structures.
    ///
    /// Every element already present is bound against this field's key path,
    /// without an index segment; the sequence is never grown or shrunk.
    pub fn nested_slice<T: Configurable>(&mut self, tag: &str, target: &'a mut [T]) -> &mut Self {
        let elements = target
            .iter_mut()
            .map(|element| element as &mut dyn Configurable)
            .collect();
        self.push(tag, Slot::StructSlice(elements))
    }

    fn push(&mut self, tag: &str, slot: Slot<'a>) -> &mut Self {
        self.entries.push(Field {
            descriptor: FieldDescriptor::parse(tag),
            slot,
        });
        self
    }

    pub(crate) fn into_entries(self) -> Vec<Field<'a>> {
        self.entries
    }
}
