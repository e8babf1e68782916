use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Generates one lens per named field plus the `FormModel` impl.
///
/// Field attributes:
/// - `#[form(skip)]` leaves the field out of the lens set and `field_keys()`.
/// - `#[form(rename = "key")]` overrides the field key (defaults to the field name).
#[proc_macro_derive(FormModel, attributes(form))]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

struct FieldOptions {
    skip: bool,
    rename: Option<LitStr>,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        ));
    }

    let model_ident = input.ident;
    let fields_struct_ident = format_ident!("{model_ident}Fields");

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return Err(syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            ));
        }
    };

    let contactus = contactus_path();
    let mut lens_defs = Vec::new();
    let mut fields_methods = Vec::new();
    let mut key_names = Vec::new();

    for field in named_fields {
        let options = field_options(&field.attrs)?;
        let Some(field_ident) = field.ident else {
            continue;
        };
        if options.skip {
            continue;
        }
        let field_ty = field.ty;
        let key_name = options
            .rename
            .map(|name| name.value())
            .unwrap_or_else(|| field_ident.to_string());
        let lens_ident = format_ident!(
            "{model_ident}{}Lens",
            to_pascal_case(&field_ident.to_string())
        );

        lens_defs.push(quote! {
            #[derive(Clone, Copy, Debug, Default)]
            pub struct #lens_ident;

            impl #contactus::form::FieldLens<#model_ident> for #lens_ident {
                type Value = #field_ty;

                fn key(self) -> #contactus::form::FieldKey {
                    #contactus::form::FieldKey::new(#key_name)
                }

                fn get<'a>(self, model: &'a #model_ident) -> &'a Self::Value {
                    &model.#field_ident
                }

                fn set(self, model: &mut #model_ident, value: Self::Value) {
                    model.#field_ident = value;
                }
            }
        });

        fields_methods.push(quote! {
            pub const fn #field_ident(&self) -> #lens_ident {
                #lens_ident
            }
        });
        key_names.push(key_name);
    }

    Ok(quote! {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #fields_struct_ident;

        impl #fields_struct_ident {
            #(#fields_methods)*
        }

        impl #contactus::form::FormModel for #model_ident {
            type Fields = #fields_struct_ident;

            fn fields() -> Self::Fields {
                #fields_struct_ident
            }

            fn field_keys() -> &'static [#contactus::form::FieldKey] {
                const KEYS: &[#contactus::form::FieldKey] = &[
                    #(#contactus::form::FieldKey::new(#key_names)),*
                ];
                KEYS
            }
        }

        #(#lens_defs)*
    })
}

fn field_options(attrs: &[Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions {
        skip: false,
        rename: None,
    };
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("form")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                options.rename = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported form attribute, expected `skip` or `rename`"))
            }
        })?;
    }
    Ok(options)
}

fn contactus_path() -> TokenStream2 {
    match crate_name("contactus") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::contactus),
    }
}

fn to_pascal_case(input: &str) -> String {
    let mut out = String::new();
    for segment in input.split('_') {
        if segment.is_empty() {
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
