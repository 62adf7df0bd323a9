use derive_more::From;

use crate::{
    array::{ArrayError, ArrayView, TypedArray},
    element::Element,
    element_type::ElementType,
};

use super::{
    typed_view::{clip_array, fill_array, finalize_array},
    Interpretation, InterpretationError, TargetedArray, TargetedDestination, TargetedView,
    TypedView,
};

/// A [`TypedView`] or [`TargetedView`] behind one interface.
#[derive(Debug, From)]
pub enum View<'b> {
    /// A view allocating its destination.
    Typed(TypedView),
    /// A view writing into a caller supplied array.
    Targeted(TargetedView<'b>),
}

/// The destination of an assembly by a [`View`].
#[derive(Debug, From)]
pub enum Destination<'d> {
    /// A newly allocated array.
    Owned(TypedArray),
    /// A caller supplied array.
    Targeted(TargetedDestination<'d>),
}

/// The result of an assembly by a [`View`].
#[derive(Debug, From)]
pub enum ViewOutput<'d> {
    /// A newly allocated array.
    Owned(TypedArray),
    /// The populated groups of a caller supplied array.
    Targeted(TargetedArray<'d>),
}

impl ViewOutput<'_> {
    /// Returns a view of the output.
    #[must_use]
    pub fn view(&self) -> ArrayView<'_> {
        match self {
            Self::Owned(array) => array.view(),
            Self::Targeted(array) => array.view(),
        }
    }

    /// Returns the shape of the output, `[num_groups, dims..]`.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        self.view().shape().to_vec()
    }

    /// Returns the element type of the output.
    #[must_use]
    pub fn element_type(&self) -> &ElementType {
        match self {
            Self::Owned(array) => array.element_type(),
            Self::Targeted(array) => array.element_type(),
        }
    }

    /// Decode the elements of the output into a [`Vec`] in lexicographical order.
    ///
    /// # Errors
    /// Returns [`ArrayError::IncompatibleElementType`] if the element type does not hold `T`.
    pub fn to_elements<T: Element>(&self) -> Result<Vec<T>, ArrayError> {
        self.view().to_elements()
    }

    /// Decode the elements of the output into an [`ndarray::ArrayD`].
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the element type does not hold `T`.
    #[cfg(feature = "ndarray")]
    pub fn to_ndarray<T: Element>(&self) -> Result<ndarray::ArrayD<T>, ArrayError> {
        self.view().to_ndarray()
    }

    /// Convert the output into an owned [`TypedArray`], copying a caller supplied array.
    #[must_use]
    pub fn into_owned(self) -> TypedArray {
        match self {
            Self::Owned(array) => array,
            Self::Targeted(array) => array.to_owned_array(),
        }
    }
}

impl View<'_> {
    /// Allocate a destination for `num_items` items.
    ///
    /// # Errors
    /// See [`TypedView::allocate_destination`] and [`TargetedView::allocate_destination`].
    pub fn allocate_destination(
        &self,
        num_items: usize,
        num_entries: usize,
    ) -> Result<Destination<'_>, InterpretationError> {
        Ok(match self {
            Self::Typed(view) => view.allocate_destination(num_items, num_entries)?.into(),
            Self::Targeted(view) => view.allocate_destination(num_items, num_entries)?.into(),
        })
    }

    /// Convert all items of `source` into the flattened destination items `item_start..item_stop`.
    ///
    /// # Errors
    /// See [`TypedView::fill`] and [`TargetedView::fill`].
    pub fn fill(
        &self,
        source: &ArrayView,
        destination: &mut Destination,
        item_start: usize,
        item_stop: usize,
        skip_entries: usize,
        num_entries: usize,
    ) -> Result<(), InterpretationError> {
        let _ = (skip_entries, num_entries);
        match destination {
            Destination::Owned(destination) => fill_array(source, destination, item_start, item_stop),
            Destination::Targeted(destination) => destination.fill(source, item_start, item_stop),
        }
    }

    /// Clip the destination to the groups `start..stop`.
    ///
    /// # Errors
    /// See [`TypedView::clip_destination`] and [`TargetedView::clip_destination`].
    pub fn clip_destination<'d>(
        &self,
        destination: Destination<'d>,
        start: usize,
        stop: usize,
    ) -> Result<Destination<'d>, InterpretationError> {
        Ok(match destination {
            Destination::Owned(destination) => clip_array(destination, start, stop)?.into(),
            Destination::Targeted(destination) => destination.clip(start, stop)?.into(),
        })
    }

    /// Finalize an assembly.
    #[must_use]
    pub fn finalize<'d>(&self, destination: Destination<'d>) -> ViewOutput<'d> {
        match destination {
            Destination::Owned(destination) => finalize_array(destination).into(),
            Destination::Targeted(destination) => destination.finish().into(),
        }
    }
}

impl Interpretation for View<'_> {
    fn source_element_type(&self) -> &ElementType {
        match self {
            Self::Typed(view) => view.source_element_type(),
            Self::Targeted(view) => view.source_element_type(),
        }
    }

    fn source_dims(&self) -> &[usize] {
        match self {
            Self::Typed(view) => view.source_dims(),
            Self::Targeted(view) => view.source_dims(),
        }
    }

    fn dest_element_type(&self) -> &ElementType {
        match self {
            Self::Typed(view) => view.dest_element_type(),
            Self::Targeted(view) => view.dest_element_type(),
        }
    }

    fn dest_dims(&self) -> &[usize] {
        match self {
            Self::Typed(view) => view.dest_dims(),
            Self::Targeted(view) => view.dest_dims(),
        }
    }
}

impl std::fmt::Display for View<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Typed(view) => std::fmt::Display::fmt(view, f),
            Self::Targeted(view) => std::fmt::Display::fmt(view, f),
        }
    }
}
