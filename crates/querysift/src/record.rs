//! Record reflection.
//!
//! A query names properties by string. This module is the bridge between
//! those names and a concrete Rust struct: the [`Record`] trait resolves a
//! name to a [`Property`], which carries the property's declared
//! [`TypeDescriptor`] and a plain function pointer reading its value.
//!
//! [`Record`] is normally derived with `#[derive(Record)]`, which maps every
//! field type through [`FieldType`]. Implementing it by hand is also simple.
//!
//! # Manual Implementation
//!
//! ```
//! use querysift::{FieldType, FieldValue, Property, Record};
//!
//! struct Task {
//!     name: String,
//!     priority: u8,
//! }
//!
//! impl Record for Task {
//!     fn property(name: &str) -> Option<Property<Self>> {
//!         fn read_name(task: &Task) -> FieldValue<'_> {
//!             task.name.field_value()
//!         }
//!         fn read_priority(task: &Task) -> FieldValue<'_> {
//!             task.priority.field_value()
//!         }
//!         match name {
//!             "name" => Some(Property::new("name", String::DESCRIPTOR, read_name)),
//!             "priority" => Some(Property::new("priority", u8::DESCRIPTOR, read_priority)),
//!             _ => None,
//!         }
//!     }
//!
//!     fn property_names() -> &'static [&'static str] {
//!         &["name", "priority"]
//!     }
//! }
//! ```

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use uuid::Uuid;

use crate::value::{FieldValue, ScalarKind, ScalarRef};

/// Declared shape of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyShape {
    /// A plain value, e.g. `i32` or `String`.
    Scalar,
    /// An optional value, e.g. `Option<i32>`.
    NullableScalar,
    /// A fixed or boxed slice, e.g. `[i32; 4]` or `Box<[String]>`.
    Array,
    /// A growable collection, e.g. `Vec<i32>` or `BTreeSet<String>`.
    Collection,
}

impl PropertyShape {
    /// Returns `true` for [`Array`](Self::Array) and [`Collection`](Self::Collection).
    pub fn is_sequence(self) -> bool {
        matches!(self, PropertyShape::Array | PropertyShape::Collection)
    }

    /// Returns the display name of this shape.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyShape::Scalar => "scalar",
            PropertyShape::NullableScalar => "nullable scalar",
            PropertyShape::Array => "array",
            PropertyShape::Collection => "collection",
        }
    }
}

impl fmt::Display for PropertyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a property: its shape and primitive family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub shape: PropertyShape,
    /// Primitive family of the value, or of the elements for sequences.
    pub kind: ScalarKind,
    /// Whether sequence elements may be absent (`Vec<Option<T>>`).
    pub nullable_elements: bool,
}

impl TypeDescriptor {
    pub const fn scalar(kind: ScalarKind) -> Self {
        TypeDescriptor {
            shape: PropertyShape::Scalar,
            kind,
            nullable_elements: false,
        }
    }

    pub const fn nullable(kind: ScalarKind) -> Self {
        TypeDescriptor {
            shape: PropertyShape::NullableScalar,
            kind,
            nullable_elements: false,
        }
    }

    pub const fn array(kind: ScalarKind, nullable_elements: bool) -> Self {
        TypeDescriptor {
            shape: PropertyShape::Array,
            kind,
            nullable_elements,
        }
    }

    pub const fn collection(kind: ScalarKind, nullable_elements: bool) -> Self {
        TypeDescriptor {
            shape: PropertyShape::Collection,
            kind,
            nullable_elements,
        }
    }

    /// Whether a single value of this type may be absent.
    ///
    /// For sequences this describes the elements, since the sentinel only
    /// ever stands for a single value.
    pub fn accepts_null(&self) -> bool {
        match self.shape {
            PropertyShape::Scalar => false,
            PropertyShape::NullableScalar => true,
            PropertyShape::Array | PropertyShape::Collection => self.nullable_elements,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            PropertyShape::Scalar => write!(f, "{}", self.kind),
            PropertyShape::NullableScalar => write!(f, "optional {}", self.kind),
            shape if self.nullable_elements => write!(f, "{shape} of optional {}", self.kind),
            shape => write!(f, "{shape} of {}", self.kind),
        }
    }
}

/// A resolved property of record type `T`.
pub struct Property<T> {
    name: &'static str,
    descriptor: TypeDescriptor,
    read: fn(&T) -> FieldValue<'_>,
}

impl<T> Property<T> {
    /// Creates a property from its name, declared type and accessor.
    pub const fn new(
        name: &'static str,
        descriptor: TypeDescriptor,
        read: fn(&T) -> FieldValue<'_>,
    ) -> Self {
        Property {
            name,
            descriptor,
            read,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn descriptor(&self) -> TypeDescriptor {
        self.descriptor
    }

    /// Returns the accessor function.
    pub fn accessor(&self) -> fn(&T) -> FieldValue<'_> {
        self.read
    }

    /// Reads this property from a record.
    pub fn read<'a>(&self, record: &'a T) -> FieldValue<'a> {
        (self.read)(record)
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Property<T> {}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// Trait for types that can be filtered by a compiled query.
///
/// Typically derived with `#[derive(Record)]`; see the module docs for a
/// hand-written implementation.
pub trait Record: Sized {
    /// Resolves a property by its exact name.
    fn property(name: &str) -> Option<Property<Self>>;

    /// Names of all queryable properties, in declaration order.
    fn property_names() -> &'static [&'static str];
}

/// Maps a Rust scalar type to its primitive family.
pub trait ScalarType {
    const KIND: ScalarKind;

    fn scalar_ref(&self) -> ScalarRef<'_>;
}

/// Maps a sequence element type (a scalar or an optional scalar).
pub trait ElementType {
    const KIND: ScalarKind;
    const NULLABLE: bool;

    fn element_ref(&self) -> Option<ScalarRef<'_>>;
}

/// Maps a record field type to its declared [`TypeDescriptor`] and reads it.
///
/// Implemented for every supported scalar type, `Option` of a scalar, and
/// the arrays and collections listed on [`PropertyShape`].
pub trait FieldType {
    const DESCRIPTOR: TypeDescriptor;

    fn field_value(&self) -> FieldValue<'_>;
}

macro_rules! scalar_types {
    ($($ty:ty => $kind:ident, |$v:ident| $conv:expr;)*) => {
        $(
            impl ScalarType for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;

                fn scalar_ref(&self) -> ScalarRef<'_> {
                    let $v = self;
                    $conv
                }
            }

            impl ElementType for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;
                const NULLABLE: bool = false;

                fn element_ref(&self) -> Option<ScalarRef<'_>> {
                    Some(self.scalar_ref())
                }
            }

            impl FieldType for $ty {
                const DESCRIPTOR: TypeDescriptor = TypeDescriptor::scalar(ScalarKind::$kind);

                fn field_value(&self) -> FieldValue<'_> {
                    FieldValue::Scalar(self.scalar_ref())
                }
            }
        )*
    };
}

scalar_types! {
    bool => Bool, |v| ScalarRef::Bool(*v);
    char => Char, |v| ScalarRef::Char(*v);
    i8 => I8, |v| ScalarRef::Int(i64::from(*v));
    i16 => I16, |v| ScalarRef::Int(i64::from(*v));
    i32 => I32, |v| ScalarRef::Int(i64::from(*v));
    i64 => I64, |v| ScalarRef::Int(*v);
    u8 => U8, |v| ScalarRef::UInt(u64::from(*v));
    u16 => U16, |v| ScalarRef::UInt(u64::from(*v));
    u32 => U32, |v| ScalarRef::UInt(u64::from(*v));
    u64 => U64, |v| ScalarRef::UInt(*v);
    f32 => F32, |v| ScalarRef::F32(*v);
    f64 => F64, |v| ScalarRef::F64(*v);
    BigDecimal => Decimal, |v| ScalarRef::Decimal(v);
    String => String, |v| ScalarRef::String(v.as_str());
    DateTime<Utc> => DateTime, |v| ScalarRef::DateTime(v.fixed_offset());
    DateTime<FixedOffset> => DateTime, |v| ScalarRef::DateTime(*v);
    TimeDelta => Duration, |v| ScalarRef::Duration(*v);
    Uuid => Uuid, |v| ScalarRef::Uuid(*v);
}

impl<S: ScalarType> ElementType for Option<S> {
    const KIND: ScalarKind = S::KIND;
    const NULLABLE: bool = true;

    fn element_ref(&self) -> Option<ScalarRef<'_>> {
        self.as_ref().map(ScalarType::scalar_ref)
    }
}

impl<S: ScalarType> FieldType for Option<S> {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::nullable(S::KIND);

    fn field_value(&self) -> FieldValue<'_> {
        match self {
            Some(v) => FieldValue::Scalar(v.scalar_ref()),
            None => FieldValue::Null,
        }
    }
}

fn sequence<'a, E, I>(items: I) -> FieldValue<'a>
where
    E: ElementType + 'a,
    I: IntoIterator<Item = &'a E>,
{
    FieldValue::Sequence(items.into_iter().map(ElementType::element_ref).collect())
}

impl<E: ElementType, const N: usize> FieldType for [E; N] {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::array(E::KIND, E::NULLABLE);

    fn field_value(&self) -> FieldValue<'_> {
        sequence(self.iter())
    }
}

impl<E: ElementType> FieldType for Box<[E]> {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::array(E::KIND, E::NULLABLE);

    fn field_value(&self) -> FieldValue<'_> {
        sequence(self.iter())
    }
}

impl<E: ElementType> FieldType for Vec<E> {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::collection(E::KIND, E::NULLABLE);

    fn field_value(&self) -> FieldValue<'_> {
        sequence(self.iter())
    }
}

impl<E: ElementType> FieldType for VecDeque<E> {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::collection(E::KIND, E::NULLABLE);

    fn field_value(&self) -> FieldValue<'_> {
        sequence(self.iter())
    }
}

impl<E: ElementType> FieldType for BTreeSet<E> {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::collection(E::KIND, E::NULLABLE);

    fn field_value(&self) -> FieldValue<'_> {
        sequence(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestItem {
        name: String,
        count: i32,
        nickname: Option<String>,
        scores: Vec<u16>,
    }

    impl Record for TestItem {
        fn property(name: &str) -> Option<Property<Self>> {
            fn read_name(item: &TestItem) -> FieldValue<'_> {
                item.name.field_value()
            }
            fn read_count(item: &TestItem) -> FieldValue<'_> {
                item.count.field_value()
            }
            fn read_nickname(item: &TestItem) -> FieldValue<'_> {
                item.nickname.field_value()
            }
            fn read_scores(item: &TestItem) -> FieldValue<'_> {
                item.scores.field_value()
            }
            match name {
                "name" => Some(Property::new("name", String::DESCRIPTOR, read_name)),
                "count" => Some(Property::new("count", i32::DESCRIPTOR, read_count)),
                "nickname" => Some(Property::new(
                    "nickname",
                    <Option<String>>::DESCRIPTOR,
                    read_nickname,
                )),
                "scores" => Some(Property::new("scores", <Vec<u16>>::DESCRIPTOR, read_scores)),
                _ => None,
            }
        }

        fn property_names() -> &'static [&'static str] {
            &["name", "count", "nickname", "scores"]
        }
    }

    fn item() -> TestItem {
        TestItem {
            name: "test".to_string(),
            count: 42,
            nickname: None,
            scores: vec![3, 7],
        }
    }

    #[test]
    fn manual_record_reads_values() {
        let item = item();
        let name = TestItem::property("name").unwrap();
        assert_eq!(name.read(&item), FieldValue::Scalar(ScalarRef::String("test")));
        let count = TestItem::property("count").unwrap();
        assert_eq!(count.read(&item), FieldValue::Scalar(ScalarRef::Int(42)));
        let nickname = TestItem::property("nickname").unwrap();
        assert_eq!(nickname.read(&item), FieldValue::Null);
        let scores = TestItem::property("scores").unwrap();
        assert_eq!(
            scores.read(&item),
            FieldValue::Sequence(vec![Some(ScalarRef::UInt(3)), Some(ScalarRef::UInt(7))])
        );
        assert!(TestItem::property("unknown").is_none());
    }

    #[test]
    fn descriptors_follow_field_types() {
        assert_eq!(i32::DESCRIPTOR, TypeDescriptor::scalar(ScalarKind::I32));
        assert_eq!(
            <Option<f64>>::DESCRIPTOR,
            TypeDescriptor::nullable(ScalarKind::F64)
        );
        assert_eq!(
            <[char; 3]>::DESCRIPTOR,
            TypeDescriptor::array(ScalarKind::Char, false)
        );
        assert_eq!(
            <Vec<Option<Uuid>>>::DESCRIPTOR,
            TypeDescriptor::collection(ScalarKind::Uuid, true)
        );
        assert_eq!(
            <BTreeSet<String>>::DESCRIPTOR.shape,
            PropertyShape::Collection
        );
        assert_eq!(<Box<[i64]>>::DESCRIPTOR.shape, PropertyShape::Array);
        assert_eq!(
            <DateTime<Utc>>::DESCRIPTOR,
            <DateTime<FixedOffset>>::DESCRIPTOR
        );
    }

    #[test]
    fn null_acceptance() {
        assert!(!String::DESCRIPTOR.accepts_null());
        assert!(<Option<String>>::DESCRIPTOR.accepts_null());
        assert!(!<Vec<i32>>::DESCRIPTOR.accepts_null());
        assert!(<Vec<Option<i32>>>::DESCRIPTOR.accepts_null());
    }

    #[test]
    fn nullable_elements_read_as_none() {
        let values: Vec<Option<i8>> = vec![Some(1), None];
        assert_eq!(
            values.field_value(),
            FieldValue::Sequence(vec![Some(ScalarRef::Int(1)), None])
        );
    }

    #[test]
    fn descriptor_display() {
        assert_eq!(i32::DESCRIPTOR.to_string(), "i32");
        assert_eq!(<Option<bool>>::DESCRIPTOR.to_string(), "optional bool");
        assert_eq!(
            <Vec<Option<String>>>::DESCRIPTOR.to_string(),
            "collection of optional string"
        );
    }
}
