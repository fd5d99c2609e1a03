use std::collections::BTreeSet;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DataEnum, DeriveInput, Fields, Ident, LitStr, parse_macro_input, spanned::Spanned};

use crate::utils;

/// One unit variant and every spelling that selects it. The first spelling
/// is the canonical one shown by `Display` and in error messages.
struct ValueVariant {
    ident: Ident,
    spellings: Vec<String>,
}

impl ValueVariant {
    fn canonical(&self) -> &str {
        &self.spellings[0]
    }
}

pub fn derive_cli_value_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let enum_ident = &input.ident;
    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "CliValue can only be derived for enums",
        ));
    };

    let option_name = option_name(input)?;
    let variants = collect_variants(data_enum)?;

    let parse_arms = variants.iter().map(|v| {
        let ident = &v.ident;
        let spellings = v.spellings.iter().map(|s| LitStr::new(s, Span::call_site()));
        quote! { #(#spellings)|* => Ok(Self::#ident), }
    });
    let str_arms = variants.iter().map(|v| {
        let ident = &v.ident;
        let canonical = LitStr::new(v.canonical(), Span::call_site());
        quote! { Self::#ident => #canonical, }
    });

    let expected = variants
        .iter()
        .map(ValueVariant::canonical)
        .collect::<Vec<_>>()
        .join("|");
    let expected_lit = LitStr::new(&expected, Span::call_site());
    let option_lit = LitStr::new(&option_name, Span::call_site());

    Ok(quote! {
        impl #enum_ident {
            pub fn parse(raw: &str) -> crate::Result<Self> {
                match raw.to_ascii_lowercase().as_str() {
                    #(#parse_arms)*
                    _ => Err(crate::Error::invalid_input(format!(
                        "Invalid value for --{}: {} (expected {})",
                        #option_lit,
                        raw,
                        #expected_lit
                    ))),
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    #(#str_arms)*
                }
            }
        }

        impl std::fmt::Display for #enum_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    })
}

/// `#[cli_value(option = "...")]`, defaulting to the kebab-cased enum name.
fn option_name(input: &DeriveInput) -> syn::Result<String> {
    let mut name = utils::to_kebab_case(&input.ident.to_string());
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("cli_value")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("option") {
                let lit: LitStr = meta.value()?.parse()?;
                name = lit.value();
                return Ok(());
            }
            Err(meta.error("unsupported cli_value attribute; expected option = \"...\""))
        })?;
    }
    Ok(name)
}

fn collect_variants(data_enum: &DataEnum) -> syn::Result<Vec<ValueVariant>> {
    let mut seen = BTreeSet::new();
    let mut variants = Vec::with_capacity(data_enum.variants.len());

    for variant in &data_enum.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "CliValue only supports enums with unit variants",
            ));
        }

        let mut spellings = vec![utils::to_kebab_case(&variant.ident.to_string())];
        for attr in variant.attrs.iter().filter(|a| a.path().is_ident("cli")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("alias") {
                    let lit: LitStr = meta.value()?.parse()?;
                    spellings.push(lit.value().to_ascii_lowercase());
                    return Ok(());
                }
                Err(meta.error("unsupported cli attribute; expected alias"))
            })?;
        }

        for spelling in &spellings {
            if !seen.insert(spelling.clone()) {
                return Err(syn::Error::new(
                    variant.span(),
                    format!("value `{spelling}` selects more than one variant"),
                ));
            }
        }

        variants.push(ValueVariant {
            ident: variant.ident.clone(),
            spellings,
        });
    }

    Ok(variants)
}
