mod decode_struct;
mod type_def_trait;

use decode_struct::decode_struct;
use proc_macro::TokenStream;
use syn::{ItemStruct, parse_macro_input};
use type_def_trait::type_def_trait;

/// Implements `Mapped` for a struct with named fields.
///
/// Struct attributes:
/// - `#[mapped(name = "Order")]` name reported in errors.
/// - `#[mapped(constructor(new, id, name))]` a constructor `Self::new(id, name)`
///   whose parameters are the listed fields, can be repeated.
///
/// Field attributes:
/// - `#[mapped(name = "column")]` store field name of the member.
/// - `#[mapped(read_only)]` the member is never assigned.
/// - `#[mapped(skip)]` not a member.
///
/// A struct implementing `Default` also gets a no-argument constructor.
#[proc_macro_derive(Mapped, attributes(mapped))]
pub fn derive_mapped(input: TokenStream) -> TokenStream {
    let metadata = decode_struct(parse_macro_input!(input as ItemStruct));
    type_def_trait(&metadata).into()
}
