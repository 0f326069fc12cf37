//! `Describe` implementations for std and third-party types

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::rc::Rc;
use std::sync::Arc;

use super::descriptor::{Describe, TypeDescriptor, WellKnown};

macro_rules! describe_integer {
    ($($ty:ty => $signed:expr),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::Integer { signed: $signed, bits: <$ty>::BITS }
                }
            }
        )*
    };
}

describe_integer! {
    i8 => true, i16 => true, i32 => true, i64 => true, i128 => true, isize => true,
    u8 => false, u16 => false, u32 => false, u64 => false, u128 => false, usize => false,
}

macro_rules! describe_as {
    ($($ty:ty => $descriptor:expr),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    $descriptor
                }
            }
        )*
    };
}

describe_as! {
    bool => TypeDescriptor::Boolean,
    f32 => TypeDescriptor::Float { bits: 32 },
    f64 => TypeDescriptor::Float { bits: 64 },
    str => TypeDescriptor::String,
    String => TypeDescriptor::String,
    () => TypeDescriptor::Unsupported("unit"),

    bytes::Bytes => TypeDescriptor::Bytes,
    bytes::BytesMut => TypeDescriptor::Bytes,

    IpAddr => TypeDescriptor::WellKnown(WellKnown::Ipv4),
    Ipv4Addr => TypeDescriptor::WellKnown(WellKnown::Ipv4),
    Ipv6Addr => TypeDescriptor::WellKnown(WellKnown::Ipv6),

    chrono::NaiveDateTime => TypeDescriptor::WellKnown(WellKnown::DateTime),
    chrono::NaiveDate => TypeDescriptor::WellKnown(WellKnown::Date),
    chrono::NaiveTime => TypeDescriptor::WellKnown(WellKnown::Time),
    uuid::Uuid => TypeDescriptor::WellKnown(WellKnown::Uuid),
    serde_json::Value => TypeDescriptor::WellKnown(WellKnown::Raw),
}

#[cfg(feature = "url")]
describe_as! {
    reqwest::Url => TypeDescriptor::WellKnown(WellKnown::Uri),
}

impl<Tz: chrono::TimeZone> Describe for chrono::DateTime<Tz> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::WellKnown(WellKnown::DateTime)
    }
}

impl Describe for Cow<'_, str> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::String
    }
}

macro_rules! describe_indirect {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<T: Describe + ?Sized> Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::Indirect(T::describe)
                }
            }
        )*
    };
}

describe_indirect!(&T, &mut T, Box<T>, Rc<T>, Arc<T>);

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Indirect(T::describe)
    }
}

impl<T: Describe> Describe for [T] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Sequence { items: T::describe }
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Array {
            items: T::describe,
            len: N,
        }
    }
}

macro_rules! describe_sequence {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<T: Describe> Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::Sequence { items: T::describe }
                }
            }
        )*
    };
}

describe_sequence!(Vec<T>, VecDeque<T>, LinkedList<T>, BTreeSet<T>);

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Sequence { items: T::describe }
    }
}

impl<K, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Map { values: V::describe }
    }
}

impl<K, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Map { values: V::describe }
    }
}

impl<K, V: Describe, S> Describe for indexmap::IndexMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Map { values: V::describe }
    }
}

impl Describe for serde_json::Map<String, serde_json::Value> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Map {
            values: serde_json::Value::describe,
        }
    }
}
