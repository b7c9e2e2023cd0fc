// The Eth Beacon Node API represents integers as strings.
// Some nodes and most hand-written fixtures use plain JSON numbers instead, so accept both.

use core::{
    fmt::{Display, Formatter, Result as FmtResult},
    marker::PhantomData,
    str::FromStr,
};

use serde::{
    de::{Error, IntoDeserializer as _, Visitor},
    Deserialize, Deserializer,
};

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Deserialize<'de> + FromStr<Err: Display>,
    D: Deserializer<'de>,
{
    struct StringOrNativeVisitor<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for StringOrNativeVisitor<T>
    where
        T: Deserialize<'de> + FromStr<Err: Display>,
    {
        type Value = T;

        fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
            formatter.write_str("an unsigned integer or a string containing one")
        }

        fn visit_str<E: Error>(self, string: &str) -> Result<Self::Value, E> {
            string.parse().map_err(E::custom)
        }

        fn visit_u64<E: Error>(self, value: u64) -> Result<Self::Value, E> {
            T::deserialize(value.into_deserializer())
        }
    }

    deserializer.deserialize_any(StringOrNativeVisitor(PhantomData))
}
