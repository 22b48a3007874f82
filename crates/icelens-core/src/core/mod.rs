mod access_context;
mod address_space;
mod macros;

pub use self::{
    access_context::{AccessContext, Gfn, Pa, TranslationMechanism, Va},
    address_space::{AddressSpace, Span},
};
