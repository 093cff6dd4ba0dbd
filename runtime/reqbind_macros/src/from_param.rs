//! `#[derive(FromParam)]` for types that know how to decode themselves from text.
use darling::{FromDeriveInput, util::Flag};
use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use crate::utils::reject_generics;

#[derive(FromDeriveInput)]
#[darling(attributes(from_param), supports(any))]
struct FromParamInput {
    generics: syn::Generics,
    ident: syn::Ident,
    /// `#[from_param(text)]`: decode via `FromStr`. It's the default.
    #[darling(default)]
    text: Flag,
    /// `#[from_param(json)]`: decode the value as a JSON literal.
    #[darling(default)]
    json: Flag,
}

pub(super) fn derive_from_param(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match _derive_from_param(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn _derive_from_param(input: DeriveInput) -> Result<proc_macro2::TokenStream, darling::Error> {
    let input = FromParamInput::from_derive_input(&input)?;
    reject_generics("FromParam", &input.ident, &input.generics)?;

    let ident = &input.ident;
    // Textual decoding wins when both strategies are requested.
    let decode = if input.json.is_present() && !input.text.is_present() {
        quote! { ::reqbind::coerce::decode_json::<Self>(value) }
    } else {
        quote! { ::reqbind::coerce::decode_text::<Self>(value) }
    };

    Ok(quote! {
        #[automatically_derived]
        impl ::reqbind::coerce::FromParam for #ident {
            fn kind() -> ::reqbind::coerce::ParamKind {
                ::reqbind::coerce::ParamKind::Decoded
            }

            fn from_param(value: &str) -> ::core::result::Result<Self, ::reqbind::coerce::CoercionError> {
                #decode
            }
        }
    })
}
