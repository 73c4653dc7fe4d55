/// Declares a binding type with one overridable method per remote operation.
///
/// ```ignore
/// use evm_binding_base::binding;
///
/// binding! {
///     /// Wrapped ether.
///     pub struct Weth: WethOperations {
///         balance_of => "balanceOf",
///         deposit => "deposit",
///     } = include_str!("../contracts/WETH9.json");
/// }
/// ```
///
/// This expands to:
///
/// - `struct Weth`, implementing [`BindingClass`](crate::BindingClass), whose
///   [`BindingType`](crate::BindingType) is generated from the artifact the
///   first time it is needed and then shared for the rest of the process.
///   Generation fails if the artifact does not define a listed operation.
/// - `trait WethOperations`, with a default `async fn balance_of(&self, args)`
///   and so on that invokes the remote operation and collapses single
///   return values.
///
/// A subtype is declared with `extends`, naming the operations trait of its
/// root type. Overrides go in the braces; inside one, `self.parent()` still
/// has the parent's implementation:
///
/// ```ignore
/// binding! {
///     pub struct BonusWeth extends Weth: WethOperations {
///         async fn balance_of(&self, args: Vec<DynSolValue>) -> Result<Output, Error> {
///             let balance = self.parent().balance_of(args).await?;
///             Ok(balance)
///         }
///     }
/// }
///
/// binding! {
///     pub struct GrandWeth extends BonusWeth: WethOperations;
/// }
/// ```
///
/// Operations a subtype does not override resolve to the nearest ancestor
/// that does, so `GrandWeth::balance_of` runs `BonusWeth`'s version.
///
/// The subtype gets its own configuration layer: `BonusWeth::set_local`
/// does not touch `Weth`.
#[macro_export]
macro_rules! binding {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident extends $parent:ty: $operations:path {
            $($overrides:tt)*
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            parent: $parent,
        }

        impl $name {
            /// The parent binding this type was derived from.
            pub fn parent(&self) -> &$parent {
                &self.parent
            }
        }

        impl $crate::BindingClass for $name {
            fn binding_type() -> ::core::result::Result<$crate::BindingType, $crate::Error> {
                static TYPE: $crate::__private::OnceCell<$crate::BindingType> =
                    $crate::__private::OnceCell::new();
                TYPE.get_or_try_init(|| -> ::core::result::Result<$crate::BindingType, $crate::Error> {
                    let parent = <$parent as $crate::BindingClass>::binding_type()?;
                    ::core::result::Result::Ok(parent.derive(::core::stringify!($name)))
                })
                .cloned()
            }

            fn from_binding(binding: $crate::Binding) -> Self {
                Self {
                    parent: <$parent as $crate::BindingClass>::from_binding(binding),
                }
            }

            fn binding(&self) -> &$crate::Binding {
                $crate::BindingClass::binding(&self.parent)
            }
        }

        #[$crate::__private::async_trait]
        impl $operations for $name {
            fn __parent_operations(&self) -> ::core::option::Option<&dyn $operations> {
                ::core::option::Option::Some(&self.parent)
            }

            fn __binding(&self) -> &$crate::Binding {
                $crate::BindingClass::binding(self)
            }

            $($overrides)*
        }
    };

    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident extends $parent:ty: $operations:path;
    ) => {
        $crate::binding! {
            $(#[$attr])*
            $vis struct $name extends $parent: $operations {}
        }
    };

    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $operations:ident {
            $($method:ident => $operation:literal),* $(,)?
        } = $artifact:expr;
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            binding: $crate::Binding,
        }

        impl $crate::BindingClass for $name {
            fn binding_type() -> ::core::result::Result<$crate::BindingType, $crate::Error> {
                static TYPE: $crate::__private::OnceCell<$crate::BindingType> =
                    $crate::__private::OnceCell::new();
                TYPE.get_or_try_init(|| -> ::core::result::Result<$crate::BindingType, $crate::Error> {
                    let ty = $crate::BindingType::from_json(::core::stringify!($name), $artifact)?;
                    ty.operations().require([$($operation),*])?;
                    ::core::result::Result::Ok(ty)
                })
                .cloned()
            }

            fn from_binding(binding: $crate::Binding) -> Self {
                Self { binding }
            }

            fn binding(&self) -> &$crate::Binding {
                &self.binding
            }
        }

        #[$crate::__private::async_trait]
        $vis trait $operations: ::core::marker::Send + ::core::marker::Sync {
            /// Implementation operations fall back to when not overridden.
            #[doc(hidden)]
            fn __parent_operations(&self) -> ::core::option::Option<&dyn $operations>;

            #[doc(hidden)]
            fn __binding(&self) -> &$crate::Binding;

            $(
                async fn $method(
                    &self,
                    args: ::std::vec::Vec<$crate::DynSolValue>,
                ) -> ::core::result::Result<$crate::Output, $crate::Error> {
                    match self.__parent_operations() {
                        ::core::option::Option::Some(parent) => parent.$method(args).await,
                        ::core::option::Option::None => self.__binding().invoke($operation, args).await,
                    }
                }
            )*
        }

        #[$crate::__private::async_trait]
        impl $operations for $name {
            fn __parent_operations(&self) -> ::core::option::Option<&dyn $operations> {
                ::core::option::Option::None
            }

            fn __binding(&self) -> &$crate::Binding {
                &self.binding
            }
        }
    };
}
