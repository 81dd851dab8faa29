//! Depth-first traversal binding fields to source chains.

use std::sync::Arc;

use tracing::{debug, trace};

use super::resolve::resolve;
use super::{Configurable, Field, FieldDescriptor, FieldKind, Fields, Slot, SourceClass};
use crate::source::Source;
use crate::ConfigError;

/// One populate pass over a structure tree.
pub(crate) struct Binder<'m> {
    pub(crate) plain: &'m [Arc<dyn Source>],
    pub(crate) secret: &'m [Arc<dyn Source>],
    pub(crate) separator: &'m str,
}

impl Binder<'_> {
    /// Binds every field of `target` under `prefix`, then runs its validation hook.
    pub(crate) fn bind(
        &self,
        prefix: &str,
        target: &mut dyn Configurable,
    ) -> Result<(), ConfigError> {
        {
            let mut fields = Fields::new();
            target.fields(&mut fields);
            for field in fields.into_entries() {
                self.bind_field(prefix, field)?;
            }
        }

        if let Some(validator) = target.validator() {
            if let Err(err) = validator.validate() {
                debug!(prefix, error = %err, "validation failed");
                return Err(ConfigError::Validation(err));
            }
        }

        Ok(())
    }

    fn bind_field(&self, prefix: &str, field: Field<'_>) -> Result<(), ConfigError> {
        let Field { descriptor, slot } = field;
        let kind = slot.kind();
        if descriptor.skip {
            trace!(prefix, ?kind, "skipping unbound field");
            return Ok(());
        }

        let chain = self.chain(descriptor.class())?;
        let key = self.key_path(prefix, &descriptor.key);
        let read = Read {
            chain,
            key: &key,
            kind,
            descriptor: &descriptor,
        };

        match slot {
            Slot::Struct(nested) => self.bind(&key, nested)?,
            Slot::StructSlice(elements) => {
                for element in elements {
                    self.bind(&key, element)?;
                }
            }
            Slot::String(target) => read.assign(target, |s, k| s.get_string(k))?,
            Slot::I8(target) => read.assign_narrowed(target, |s, k| s.get_int(k))?,
            Slot::I16(target) => read.assign_narrowed(target, |s, k| s.get_int(k))?,
            Slot::I32(target) => read.assign_narrowed(target, |s, k| s.get_int(k))?,
            Slot::Isize(target) => read.assign(target, |s, k| s.get_int(k))?,
            Slot::I64(target) => read.assign(target, |s, k| s.get_int64(k))?,
            Slot::U8(target) => read.assign_narrowed(target, |s, k| s.get_uint(k))?,
            Slot::U16(target) => read.assign_narrowed(target, |s, k| s.get_uint(k))?,
            Slot::U32(target) => read.assign_narrowed(target, |s, k| s.get_uint(k))?,
            Slot::Usize(target) => read.assign(target, |s, k| s.get_uint(k))?,
            Slot::U64(target) => read.assign(target, |s, k| s.get_uint64(k))?,
            Slot::F32(target) => {
                if let Some(value) = read.value(|s, k| s.get_float(k))? {
                    *target = value as f32;
                }
            }
            Slot::F64(target) => read.assign(target, |s, k| s.get_float(k))?,
            Slot::Bool(target) => read.assign(target, |s, k| s.get_bool(k))?,
            Slot::Duration(target) => read.assign(target, |s, k| s.get_duration(k))?,
            Slot::StringSlice(target) => read.assign(target, |s, k| s.get_string_slice(k))?,
            Slot::IntSlice(target) => read.assign(target, |s, k| s.get_int_slice(k))?,
            Slot::Int64Slice(target) => read.assign(target, |s, k| s.get_int64_slice(k))?,
            Slot::UintSlice(target) => read.assign(target, |s, k| s.get_uint_slice(k))?,
            Slot::Uint64Slice(target) => read.assign(target, |s, k| s.get_uint64_slice(k))?,
            Slot::FloatSlice(target) => read.assign(target, |s, k| s.get_float_slice(k))?,
            Slot::BoolSlice(target) => read.assign(target, |s, k| s.get_bool_slice(k))?,
            Slot::I8Slice(target) => {
                read.assign_narrowed_slice(target, |s, k| s.get_int_slice(k))?
            }
            Slot::I16Slice(target) => {
                read.assign_narrowed_slice(target, |s, k| s.get_int_slice(k))?
            }
            Slot::I32Slice(target) => {
                read.assign_narrowed_slice(target, |s, k| s.get_int_slice(k))?
            }
            Slot::U8Slice(target) => {
                read.assign_narrowed_slice(target, |s, k| s.get_uint_slice(k))?
            }
            Slot::U16Slice(target) => {
                read.assign_narrowed_slice(target, |s, k| s.get_uint_slice(k))?
            }
            Slot::U32Slice(target) => {
                read.assign_narrowed_slice(target, |s, k| s.get_uint_slice(k))?
            }
            Slot::F32Slice(target) => {
                if let Some(values) = read.value(|s, k| s.get_float_slice(k))? {
                    *target = values.into_iter().map(|value| value as f32).collect();
                }
            }
        }

        Ok(())
    }

    fn chain(&self, class: SourceClass) -> Result<&[Arc<dyn Source>], ConfigError> {
        match class {
            SourceClass::Secret if self.secret.is_empty() => {
                Err(ConfigError::NoSecretSourceDefined)
            }
            SourceClass::Plain if self.plain.is_empty() => {
                Err(ConfigError::NoPlainSourceDefined)
            }
            SourceClass::Secret => Ok(self.secret),
            SourceClass::Plain => Ok(self.plain),
        }
    }

    fn key_path(&self, prefix: &str, segment: &str) -> String {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{prefix}{}{segment}", self.separator)
        }
    }
}

/// A pending read of one leaf field.
struct Read<'r> {
    chain: &'r [Arc<dyn Source>],
    key: &'r str,
    kind: FieldKind,
    descriptor: &'r FieldDescriptor,
}

impl Read<'_> {
    /// Resolves the value, mapping a miss on an optional field to `None`.
    fn value<T>(
        &self,
        get: impl Fn(&dyn Source, &str) -> Result<T, ConfigError>,
    ) -> Result<Option<T>, ConfigError> {
        match resolve(self.chain, self.key, |source| get(source, self.key)) {
            Ok(value) => {
                debug!(
                    key = self.key,
                    kind = ?self.kind,
                    class = %self.descriptor.class(),
                    "bound field"
                );
                Ok(Some(value))
            }
            Err(err) if err.is_key_not_found() && !self.descriptor.required => {
                trace!(key = self.key, "optional field absent, keeping default");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn assign<T>(
        &self,
        target: &mut T,
        get: impl Fn(&dyn Source, &str) -> Result<T, ConfigError>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = self.value(get)? {
            *target = value;
        }
        Ok(())
    }

    /// Like [`assign`](Self::assign) for targets narrower than the accessor type.
    fn assign_narrowed<T, W>(
        &self,
        target: &mut T,
        get: impl Fn(&dyn Source, &str) -> Result<W, ConfigError>,
    ) -> Result<(), ConfigError>
    where
        T: TryFrom<W>,
        W: Copy + std::fmt::Display,
    {
        if let Some(wide) = self.value(get)? {
            *target = self.narrow(wide)?;
        }
        Ok(())
    }

    /// Narrows every element; one element out of range rejects the whole sequence.
    fn assign_narrowed_slice<T, W>(
        &self,
        target: &mut Vec<T>,
        get: impl Fn(&dyn Source, &str) -> Result<Vec<W>, ConfigError>,
    ) -> Result<(), ConfigError>
    where
        T: TryFrom<W>,
        W: Copy + std::fmt::Display,
    {
        if let Some(wide) = self.value(get)? {
            *target = wide
                .into_iter()
                .map(|element| self.narrow(element))
                .collect::<Result<_, _>>()?;
        }
        Ok(())
    }

    fn narrow<T, W>(&self, wide: W) -> Result<T, ConfigError>
    where
        T: TryFrom<W>,
        W: Copy + std::fmt::Display,
    {
        T::try_from(wide).map_err(|_| ConfigError::OutOfRange {
            key: self.key.to_string(),
            value: wide.to_string(),
            target: std::any::type_name::<T>(),
        })
    }
}
