use proc_macro::TokenStream;

mod from_param;
mod params;
mod reply;
mod request_shape;
mod utils;

#[proc_macro_derive(RequestShape, attributes(bind, request))]
pub fn derive_request_shape(input: TokenStream) -> TokenStream {
    request_shape::derive_request_shape(input)
}

#[proc_macro_derive(Params, attributes(param))]
pub fn derive_params(input: TokenStream) -> TokenStream {
    params::derive_params(input)
}

#[proc_macro_derive(FromParam, attributes(from_param))]
pub fn derive_from_param(input: TokenStream) -> TokenStream {
    from_param::derive_from_param(input)
}

#[proc_macro_derive(Reply, attributes(reply))]
pub fn derive_reply(input: TokenStream) -> TokenStream {
    reply::derive_reply(input)
}
