pub mod nonstandard;
pub mod redacting_url;

pub mod phase0 {
    pub mod consts;
    pub mod containers;
    pub mod primitives;
}
