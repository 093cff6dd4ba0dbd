use darling::{FromDeriveInput, util::Flag};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, parse_macro_input};

use crate::utils::reject_generics;

#[derive(FromDeriveInput)]
#[darling(attributes(reply), supports(any))]
struct ReplyInput {
    generics: syn::Generics,
    ident: syn::Ident,
    #[darling(default)]
    json: Flag,
    #[darling(default)]
    text: Flag,
    #[darling(default)]
    render: Flag,
}

pub(super) fn derive_reply(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match _derive_reply(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn _derive_reply(input: DeriveInput) -> Result<proc_macro2::TokenStream, darling::Error> {
    let input = ReplyInput::from_derive_input(&input)?;
    reject_generics("Reply", &input.ident, &input.generics)?;

    let ident = &input.ident;
    let strategies: Vec<_> = [
        ("json", &input.json),
        ("text", &input.text),
        ("render", &input.render),
    ]
    .into_iter()
    .filter(|(_, flag)| flag.is_present())
    .collect();
    let strategy = match strategies.as_slice() {
        [] => "json",
        [(name, _)] => *name,
        [_, (name, _), ..] => {
            return Err(darling::Error::custom(format!(
                "`{ident}` can only be rendered in one way, but `{name}` was requested as well.\n\
                 help: Keep only one of `#[reply(json)]`, `#[reply(text)]` or `#[reply(render)]`.",
            ))
            .with_span(ident));
        }
    };
    let strategy = format_ident!("{}", strategy);

    Ok(quote! {
        #[automatically_derived]
        impl ::reqbind::response::Reply for #ident {
            fn reply(
                self,
                ctx: &mut ::reqbind::pipeline::Context<'_>,
            ) -> ::core::result::Result<(), ::reqbind::response::RenderError> {
                ::reqbind::response::reply::#strategy(&self, ctx)
            }
        }
    })
}
