use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Path, parse_macro_input, spanned::Spanned};

use crate::utils;

/// A field opted into CLI parsing with `#[cli(long = "...")]`.
struct CliField {
    ident: syn::Ident,
    ty: syn::Type,
    long: String,
    flag: bool,
    parse_with: Option<Path>,
}

pub fn derive_cli_options_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let struct_ident = input.ident.clone();

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new(input.span(), "CliOptions can only be derived for structs")
            .to_compile_error()
            .into();
    };

    let Fields::Named(fields) = &data_struct.fields else {
        return syn::Error::new(input.span(), "CliOptions requires named fields")
            .to_compile_error()
            .into();
    };

    let mut cli_fields = Vec::new();
    for field in &fields.named {
        let Some(ident) = &field.ident else {
            continue;
        };

        let mut long: Option<String> = None;
        let mut flag = false;
        let mut parse_with: Option<Path> = None;

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("cli")) {
            let parsed = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("long") {
                    let lit: LitStr = meta.value()?.parse()?;
                    long = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("flag") {
                    flag = true;
                    Ok(())
                } else if meta.path.is_ident("parse_with") {
                    let lit: LitStr = meta.value()?.parse()?;
                    parse_with = Some(syn::parse_str(&lit.value())?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported cli attribute; expected long/flag/parse_with"))
                }
            });
            if let Err(err) = parsed {
                return err.to_compile_error().into();
            }
        }

        if let Some(long) = long {
            if flag && parse_with.is_some() {
                return syn::Error::new(field.span(), "cli flags cannot use parse_with")
                    .to_compile_error()
                    .into();
            }
            cli_fields.push(CliField {
                ident: ident.clone(),
                ty: field.ty.clone(),
                long,
                flag,
                parse_with,
            });
        }
    }

    let mut arms = Vec::new();
    let mut flag_names = Vec::new();

    for field in &cli_fields {
        let ident = &field.ident;
        let long_lit = LitStr::new(&field.long, Span::call_site());

        if field.flag {
            let negated_lit = LitStr::new(&format!("no-{}", field.long), Span::call_site());
            flag_names.push(long_lit.clone());
            flag_names.push(negated_lit.clone());
            arms.push(quote! {
                #long_lit => {
                    self.#ident = match value {
                        Some(raw) => Self::parse_flag_value(name, &raw)?,
                        None => true,
                    };
                    Ok(true)
                }
            });
            arms.push(quote! {
                #negated_lit => {
                    if value.is_some() {
                        return Err(crate::Error::invalid_input(format!(
                            "Flag --{name} does not take a value"
                        )));
                    }
                    self.#ident = false;
                    Ok(true)
                }
            });
        } else {
            let parse_expr = utils::build_cli_parse_expr(&field.ty, field.parse_with.as_ref());
            arms.push(quote! {
                #long_lit => {
                    let raw = value.ok_or_else(|| {
                        crate::Error::invalid_input(format!("Missing value for --{name}"))
                    })?;
                    self.#ident = #parse_expr;
                    Ok(true)
                }
            });
        }
    }

    let expanded = quote! {
        impl #struct_ident {
            const CLI_FLAGS: &'static [&'static str] = &[#(#flag_names),*];

            fn split_arg(
                raw_name: &str,
                args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
            ) -> (String, Option<String>) {
                if let Some((k, v)) = raw_name.split_once('=') {
                    return (k.to_string(), Some(v.to_string()));
                }
                if Self::CLI_FLAGS.contains(&raw_name) {
                    return (raw_name.to_string(), None);
                }

                let value = match args.peek() {
                    Some(next) if !next.starts_with("--") => args.next(),
                    _ => None,
                };

                (raw_name.to_string(), value)
            }

            fn parse_flag_value(name: &str, raw: &str) -> crate::Result<bool> {
                match raw.to_ascii_lowercase().as_str() {
                    "1" | "true" | "yes" | "on" => Ok(true),
                    "0" | "false" | "no" | "off" => Ok(false),
                    _ => Err(crate::Error::invalid_input(format!(
                        "Invalid boolean for --{name}: {raw} (expected true/false)"
                    ))),
                }
            }

            fn apply_cli_option(
                &mut self,
                name: &str,
                value: Option<String>,
            ) -> crate::Result<bool> {
                match name {
                    #(#arms,)*
                    _ => Ok(false),
                }
            }
        }
    };

    TokenStream::from(expanded)
}
