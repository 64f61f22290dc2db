//! Procedural macros capturing tool signatures at compile time

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{
    parse_macro_input, Attribute, Expr, ExprLit, FnArg, ImplItem, ItemFn, ItemImpl, Lit, Meta,
    Pat, ReturnType, Signature, Type, Visibility,
};

/// Attribute macro exposing a free function as a tool
///
/// # Example
///
/// ```ignore
/// /// Get the current weather in a given location
/// ///
/// /// # Arguments
/// ///
/// /// * `location` - The city and state
/// #[tool]
/// fn get_current_weather(
///     location: String,
///     #[default("fahrenheit")] unit: String,
/// ) -> String {
///     // Implementation
/// }
/// ```
///
/// The function is left as written (minus the parameter attributes) and a
/// module `get_current_weather_tool` is generated next to it containing:
/// - `NAME`: the exposed tool name
/// - `signature()`: the captured `FunctionSignature`
/// - `callable()`: a `FunctionTool` ready for registration
///
/// The function must be declared at module level, since the generated module
/// reaches it through `super`.
///
/// # Attributes
///
/// - `name`: (optional) Override the tool name (defaults to function name)
/// - `description`: (optional) Override the description taken from the docs
///
/// # Parameter attributes
///
/// - `#[default(expr)]`: the value bound when the argument is omitted
/// - `#[one_of(a, b, ...)]`: a closed set of literals, the first is the default
#[proc_macro_attribute]
pub fn tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr_args = parse_macro_input!(attr with Punctuated::<Meta, Comma>::parse_terminated);
    let mut input_fn = parse_macro_input!(item as ItemFn);

    match expand_tool(attr_args, &mut input_fn) {
        Ok(output) => output.into(),
        Err(err) => {
            strip_param_attrs(&mut input_fn.sig);
            let err = err.to_compile_error();
            quote!(#input_fn #err).into()
        }
    }
}

/// Attribute macro exposing the public `&self` methods of an impl block
///
/// # Example
///
/// ```ignore
/// struct WeatherService {
///     location: String,
/// }
///
/// #[tools]
/// impl WeatherService {
///     /// Get the current weather
///     pub fn get_current_weather(&self, #[default("fahrenheit")] unit: String) -> String {
///         // Implementation
///     }
///
///     #[tool(skip)]
///     pub fn refresh(&self) {}
/// }
///
/// registry.register_instance("boston", Arc::new(service))?;
/// ```
///
/// Implements `ToolInstance` for the type. Methods are exposed when they are
/// `pub`, take `&self`, do not start with `_` and are not marked
/// `#[tool(skip)]`. `#[tool(name = ..., description = ...)]` on a method works
/// as on a free function.
#[proc_macro_attribute]
pub fn tools(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut input_impl = parse_macro_input!(item as ItemImpl);
    let attr: TokenStream2 = attr.into();
    if !attr.is_empty() {
        let err = syn::Error::new_spanned(attr, "tools attribute takes no arguments")
            .to_compile_error();
        return quote!(#input_impl #err).into();
    }

    match expand_tools(&mut input_impl) {
        Ok(output) => output.into(),
        Err(err) => {
            let err = err.to_compile_error();
            quote!(#input_impl #err).into()
        }
    }
}

#[derive(Default)]
struct ToolOptions {
    name: Option<String>,
    description: Option<String>,
    skip: bool,
}

impl ToolOptions {
    fn parse(args: impl IntoIterator<Item = Meta>) -> syn::Result<Self> {
        let mut options = ToolOptions::default();
        for arg in args {
            match &arg {
                Meta::NameValue(nv) if nv.path.is_ident("name") => {
                    options.name = Some(string_literal(&nv.value)?);
                }
                Meta::NameValue(nv) if nv.path.is_ident("description") => {
                    options.description = Some(string_literal(&nv.value)?);
                }
                Meta::Path(path) if path.is_ident("skip") => options.skip = true,
                _ => {
                    return Err(syn::Error::new_spanned(
                        arg,
                        "expected `name = \"...\"`, `description = \"...\"` or `skip`",
                    ))
                }
            }
        }
        Ok(options)
    }

    fn from_attribute(attr: &Attribute) -> syn::Result<Self> {
        match &attr.meta {
            Meta::Path(_) => Ok(Self::default()),
            Meta::List(list) => {
                Self::parse(list.parse_args_with(Punctuated::<Meta, Comma>::parse_terminated)?)
            }
            Meta::NameValue(_) => Err(syn::Error::new_spanned(attr, "expected #[tool(...)]")),
        }
    }
}

fn string_literal(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => Ok(lit.value()),
        _ => Err(syn::Error::new_spanned(expr, "expected a string literal")),
    }
}

fn expand_tool(
    attr_args: Punctuated<Meta, Comma>,
    input_fn: &mut ItemFn,
) -> syn::Result<TokenStream2> {
    let options = ToolOptions::parse(attr_args)?;
    if options.skip {
        return Err(syn::Error::new_spanned(
            &input_fn.sig.ident,
            "`skip` only applies to methods inside #[tools]",
        ));
    }
    check_signature(&input_fn.sig)?;
    if let Some(FnArg::Receiver(receiver)) = input_fn.sig.inputs.first() {
        return Err(syn::Error::new_spanned(
            receiver,
            "#[tool] applies to free functions; use #[tools] on the impl block for methods",
        ));
    }

    let fn_name = input_fn.sig.ident.clone();
    let tool_name = options
        .name
        .clone()
        .unwrap_or_else(|| fn_name.unraw().to_string());
    let params = collect_params(&mut input_fn.sig)?;
    let signature = signature_tokens(&tool_name, &input_fn.attrs, &options, &params);

    let bindings = params.iter().map(Param::binding);
    let idents = params.iter().map(|param| &param.ident);
    let output = output_fn(&input_fn.sig.output);

    let module_name = format_ident!("{}_tool", fn_name.unraw());
    let vis = &input_fn.vis;

    Ok(quote! {
        #input_fn

        #[allow(dead_code)]
        #vis mod #module_name {
            use super::*;

            /// The name this tool is exposed under
            pub const NAME: &str = #tool_name;

            /// The captured signature and documentation
            pub fn signature() -> ::llm_functools::FunctionSignature {
                #signature
            }

            /// A callable ready for registration
            pub fn callable() -> ::llm_functools::FunctionTool {
                ::llm_functools::FunctionTool::new(
                    signature(),
                    |__arguments: &mut ::llm_functools::Arguments| {
                        #(#bindings)*
                        ::llm_functools::__private::#output(super::#fn_name(#(#idents),*))
                    },
                )
            }
        }
    })
}

fn expand_tools(input_impl: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input_impl.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[tools] applies to inherent impl blocks only",
        ));
    }
    if !input_impl.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input_impl.generics,
            "#[tools] does not support generic impl blocks",
        ));
    }

    let mut methods = Vec::new();
    for item in &mut input_impl.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };

        let mut options = ToolOptions::default();
        let mut attrs = Vec::with_capacity(method.attrs.len());
        for attr in method.attrs.drain(..) {
            if attr.path().is_ident("tool") {
                options = ToolOptions::from_attribute(&attr)?;
            } else {
                attrs.push(attr);
            }
        }
        method.attrs = attrs;

        let exposed = matches!(method.vis, Visibility::Public(_))
            && takes_shared_self(&method.sig)
            && !method.sig.ident.unraw().to_string().starts_with('_')
            && !options.skip;
        if !exposed {
            strip_param_attrs(&mut method.sig);
            continue;
        }
        check_signature(&method.sig)?;

        let method_name = method.sig.ident.clone();
        let tool_name = options
            .name
            .clone()
            .unwrap_or_else(|| method_name.unraw().to_string());
        let params = collect_params(&mut method.sig)?;
        let signature = signature_tokens(&tool_name, &method.attrs, &options, &params);
        let bindings = params.iter().map(Param::binding);
        let idents = params.iter().map(|param| &param.ident);
        let output = output_fn(&method.sig.output);

        methods.push(quote! {
            ::llm_functools::MethodTool::new(
                #signature,
                |__this: &Self, __arguments: &mut ::llm_functools::Arguments|
                    -> ::std::result::Result<
                        ::llm_functools::__private::serde_json::Value,
                        ::llm_functools::InvocationError,
                    >
                {
                    #(#bindings)*
                    ::llm_functools::__private::#output(__this.#method_name(#(#idents),*))
                },
            )
        });
    }

    let self_ty = &input_impl.self_ty;
    Ok(quote! {
        #input_impl

        impl ::llm_functools::ToolInstance for #self_ty {
            fn tool_methods() -> ::std::vec::Vec<::llm_functools::MethodTool<Self>> {
                ::std::vec![#(#methods),*]
            }
        }
    })
}

/// One captured parameter
struct Param {
    ident: syn::Ident,
    name: String,
    ty: Type,
    default: ParamDefault,
}

enum ParamDefault {
    None,
    Value(Expr),
    OneOf(Vec<Expr>),
}

impl Param {
    fn binding(&self) -> TokenStream2 {
        let ident = &self.ident;
        let ty = &self.ty;
        let name = &self.name;
        quote! {
            let #ident: #ty = __arguments.take(#name)?;
        }
    }

    fn signature(&self) -> TokenStream2 {
        let name = &self.name;
        let ty = &self.ty;
        let ty_text = quote!(#ty).to_string();
        let default = match &self.default {
            ParamDefault::None => quote!(),
            ParamDefault::Value(expr) => quote! {
                .with_default(::llm_functools::__private::serde_json::json!(#expr))
            },
            ParamDefault::OneOf(values) => quote! {
                .with_one_of(::std::vec![
                    #(::llm_functools::__private::serde_json::json!(#values)),*
                ])
            },
        };
        quote! {
            ::llm_functools::ParamSignature::new(#name).with_type(#ty_text) #default
        }
    }
}

fn check_signature(sig: &Signature) -> syn::Result<()> {
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "tool functions must be synchronous",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "tool functions cannot be generic",
        ));
    }
    Ok(())
}

fn takes_shared_self(sig: &Signature) -> bool {
    matches!(
        sig.inputs.first(),
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() && receiver.mutability.is_none()
    )
}

/// Collect typed parameters and remove their `default`/`one_of` attributes
fn collect_params(sig: &mut Signature) -> syn::Result<Vec<Param>> {
    let mut params = Vec::new();
    for input in sig.inputs.iter_mut() {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };

        let default = take_default(&mut pat_type.attrs)?;
        let ident = match pat_type.pat.as_ref() {
            Pat::Ident(pat_ident) if pat_ident.subpat.is_none() => pat_ident.ident.clone(),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "tool parameters must be plain identifiers",
                ))
            }
        };
        if matches!(pat_type.ty.as_ref(), Type::Reference(_) | Type::ImplTrait(_)) {
            return Err(syn::Error::new_spanned(
                &pat_type.ty,
                "tool parameters must be owned types",
            ));
        }

        params.push(Param {
            name: ident.unraw().to_string(),
            ident,
            ty: (*pat_type.ty).clone(),
            default,
        });
    }

    let mut seen = Vec::with_capacity(params.len());
    for param in &params {
        if seen.contains(&param.name) {
            return Err(syn::Error::new_spanned(
                &param.ident,
                "duplicate parameter name",
            ));
        }
        seen.push(param.name.clone());
    }
    Ok(params)
}

fn take_default(attrs: &mut Vec<Attribute>) -> syn::Result<ParamDefault> {
    let mut default = ParamDefault::None;
    let mut kept = Vec::with_capacity(attrs.len());
    for attr in attrs.drain(..) {
        let parsed = if attr.path().is_ident("default") {
            ParamDefault::Value(attr.parse_args::<Expr>()?)
        } else if attr.path().is_ident("one_of") {
            let values = attr.parse_args_with(Punctuated::<Expr, Comma>::parse_terminated)?;
            if values.is_empty() {
                return Err(syn::Error::new_spanned(attr, "one_of needs at least one value"));
            }
            ParamDefault::OneOf(values.into_iter().collect())
        } else {
            kept.push(attr);
            continue;
        };
        if !matches!(default, ParamDefault::None) {
            return Err(syn::Error::new_spanned(
                attr,
                "a parameter takes at most one of #[default] and #[one_of]",
            ));
        }
        default = parsed;
    }
    *attrs = kept;
    Ok(default)
}

fn strip_param_attrs(sig: &mut Signature) {
    for input in sig.inputs.iter_mut() {
        if let FnArg::Typed(pat_type) = input {
            pat_type
                .attrs
                .retain(|attr| !attr.path().is_ident("default") && !attr.path().is_ident("one_of"));
        }
    }
}

/// Doc comment text with the single leading space of `/// text` removed
fn doc_text(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(lit), ..
                }) => Some(lit.value()),
                _ => None,
            },
            _ => None,
        })
        .flat_map(|text| {
            text.split('\n')
                .map(|line| line.strip_prefix(' ').unwrap_or(line).trim_end().to_string())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn signature_tokens(
    tool_name: &str,
    attrs: &[Attribute],
    options: &ToolOptions,
    params: &[Param],
) -> TokenStream2 {
    let doc = doc_text(attrs);
    let description = options.description.as_ref().map(|description| {
        quote!(.with_description(#description))
    });
    let params = params.iter().map(Param::signature);
    quote! {
        ::llm_functools::FunctionSignature::new(#tool_name)
            .with_doc(#doc)
            #description
            #(.with_param(#params))*
    }
}

/// `fallible_output` for functions returning a `Result`, `into_output` otherwise
fn output_fn(output: &ReturnType) -> syn::Ident {
    let fallible = match output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(type_path) => type_path
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == "Result"),
            _ => false,
        },
        ReturnType::Default => false,
    };
    if fallible {
        format_ident!("fallible_output")
    } else {
        format_ident!("into_output")
    }
}
