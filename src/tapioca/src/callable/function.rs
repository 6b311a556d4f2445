use std::marker::PhantomData;

use crate::callable::FunctionParameter;
use crate::container::Managed;
use crate::reflect::{ArgumentError, BoxError, Parameter, ResolvedArguments};

/// A specialized form of [`FnOnce`] whose parameters can be described to and
/// supplied by the container.
///
/// Closures of `FnOnce(A1, A2, ...) -> Result<T, E>` where every `Ai` is a
/// [`FunctionParameter`] are [`Function`]. Due to the lack of support for
/// functions of variable length parameters, [`Function`] is only implemented
/// by any function whose arity is at most 16.
pub trait Function<D> {
    type Output: Managed;

    type Error: Into<BoxError>;

    fn parameters() -> Vec<Parameter>;

    /// Takes every parameter from `arguments` and calls `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if `arguments` don't match [`Function::parameters`].
    ///
    /// Returns the function's own error wrapped in the outer [`Ok`].
    fn call(
        self,
        arguments: &mut ResolvedArguments,
    ) -> Result<Result<Self::Output, Self::Error>, ArgumentError>;
}

impl<F, T, E> Function<()> for F
where
    F: FnOnce() -> Result<T, E>,
    T: Managed,
    E: Into<BoxError>,
{
    type Output = T;

    type Error = E;

    fn parameters() -> Vec<Parameter> {
        Vec::new()
    }

    fn call(
        self,
        _arguments: &mut ResolvedArguments,
    ) -> Result<Result<Self::Output, Self::Error>, ArgumentError> {
        Ok(self())
    }
}

macro_rules! for_all_tuples {
    ($implementation:ident) => {
        $implementation!(D1);
        $implementation!(D1, D2);
        $implementation!(D1, D2, D3);
        $implementation!(D1, D2, D3, D4);
        $implementation!(D1, D2, D3, D4, D5);
        $implementation!(D1, D2, D3, D4, D5, D6);
        $implementation!(D1, D2, D3, D4, D5, D6, D7);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11, D12);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11, D12, D13);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11, D12, D13, D14);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11, D12, D13, D14, D15);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11, D12, D13, D14, D15, D16);
    };
}

macro_rules! impl_function {
    ($($dep:ident),*) => {
        #[allow(non_snake_case)]
        impl<F, T, E, $($dep,)*> Function<($($dep,)*)> for F
        where
            F: FnOnce($($dep,)*) -> Result<T, E>,
            T: Managed,
            E: Into<BoxError>,
            $($dep: FunctionParameter,)*
        {
            type Output = T;

            type Error = E;

            fn parameters() -> Vec<Parameter> {
                let mut parameters = Vec::new();
                $(
                    parameters.push($dep::describe(parameters.len()));
                )*
                parameters
            }

            fn call(
                self,
                arguments: &mut ResolvedArguments,
            ) -> Result<Result<Self::Output, Self::Error>, ArgumentError> {
                $(
                    let $dep = $dep::extract(arguments)?;
                )*
                Ok(self($($dep,)*))
            }
        }
    };
}

for_all_tuples!(impl_function);

/// A [`Function`] with its parameter types erased.
pub(crate) trait ErasedFunction {
    fn parameters(&self) -> Vec<Parameter>;

    fn call(self: Box<Self>, arguments: &mut ResolvedArguments)
        -> Result<Box<dyn Managed>, BoxError>;
}

pub(crate) struct FunctionWrapper<F, D> {
    function: F,
    _marker: PhantomData<fn() -> D>,
}

impl<F, D> FunctionWrapper<F, D>
where
    F: Function<D>,
{
    pub fn new(function: F) -> Self {
        Self {
            function,
            _marker: PhantomData,
        }
    }
}

impl<F, D> ErasedFunction for FunctionWrapper<F, D>
where
    F: Function<D>,
{
    fn parameters(&self) -> Vec<Parameter> {
        F::parameters()
    }

    fn call(
        self: Box<Self>,
        arguments: &mut ResolvedArguments,
    ) -> Result<Box<dyn Managed>, BoxError> {
        match self.function.call(arguments) {
            Ok(Ok(output)) => {
                let output: Box<dyn Managed> = Box::new(output);
                Ok(output)
            }
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(err.into()),
        }
    }
}
