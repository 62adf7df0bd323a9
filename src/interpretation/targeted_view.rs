use std::{
    cell::{RefCell, RefMut},
    ops::Range,
};

use crate::{
    array::{
        dims_product, format_dims, resolve_range, validate_dims, ArrayError, ArrayView, Dims,
        TypedArray,
    },
    config::global_config,
    element::Element,
    element_type::{ElementType, ElementTypeSpec},
};

use super::{
    destination_groups, fill_items, validate_conversion, Interpretation, InterpretationError,
};

/// An interpretation of raw bytes as a source element type and dimensions, converted into a caller supplied [`TypedArray`].
///
/// The destination element type and dimensions are those of the caller's array (its element type and all dimensions after the first).
/// The caller's array is lent to one assembly at a time and may hold more groups than an assembly needs.
#[derive(Debug)]
pub struct TargetedView<'b> {
    source_type: ElementType,
    source_dims: Dims,
    dest_type: ElementType,
    dest_shape: Dims,
    target: RefCell<&'b mut TypedArray>,
}

/// The destination of a [`TargetedView`] assembly: the caller's array and the number of groups the assembly populates.
#[derive(Debug)]
pub struct TargetedDestination<'d> {
    target: RefMut<'d, TypedArray>,
    window: Range<usize>,
    stop: usize,
}

impl TargetedDestination<'_> {
    /// Returns the number of groups populated by the assembly.
    #[must_use]
    pub fn stop(&self) -> usize {
        self.stop
    }

    /// Returns the range of groups of the caller's array addressed by the destination.
    #[must_use]
    pub fn groups(&self) -> Range<usize> {
        self.window.clone()
    }
}

impl<'d> TargetedDestination<'d> {
    pub(super) fn fill(
        &mut self,
        source: &ArrayView,
        item_start: usize,
        item_stop: usize,
    ) -> Result<(), InterpretationError> {
        let dest_type = *self.target.element_type();
        let group_bytes = self.target.group_size() * dest_type.size();
        let Range { start, end } = self.window;
        fill_items(
            source,
            &dest_type,
            &mut self.target.as_bytes_mut()[start * group_bytes..end * group_bytes],
            item_start,
            item_stop,
        )
    }

    pub(super) fn clip(self, start: usize, stop: usize) -> Result<Self, InterpretationError> {
        let range = resolve_range(
            start,
            stop,
            self.window.len(),
            global_config().strict_ranges(),
        )?;
        let offset = self.window.start;
        Ok(Self {
            window: offset + range.start..offset + range.end,
            ..self
        })
    }

    /// Trim to the populated groups.
    pub(super) fn finish(self) -> TargetedArray<'d> {
        let Self {
            target,
            window,
            stop,
        } = self;
        let groups = window.start..window.start + stop.min(window.len());
        tracing::debug!(?groups, "finalized destination");
        TargetedArray { target, groups }
    }
}

/// The result of a [`TargetedView`] assembly: the populated groups of the caller's array.
///
/// The caller's array is available for another assembly once this is dropped.
#[derive(Debug)]
pub struct TargetedArray<'d> {
    target: RefMut<'d, TypedArray>,
    groups: Range<usize>,
}

impl TargetedArray<'_> {
    /// Returns a view of the populated groups.
    #[must_use]
    pub fn view(&self) -> ArrayView<'_> {
        self.target.view().slice_groups_in_bounds(self.groups.clone())
    }

    /// Returns the element type.
    #[must_use]
    pub fn element_type(&self) -> &ElementType {
        self.target.element_type()
    }

    /// Returns the shape of the populated groups, `[num_groups, dims..]`.
    #[must_use]
    pub fn shape(&self) -> Dims {
        std::iter::once(self.groups.len())
            .chain(self.target.dims().iter().copied())
            .collect()
    }

    /// Returns the range of groups of the caller's array that were populated.
    #[must_use]
    pub fn groups(&self) -> Range<usize> {
        self.groups.clone()
    }

    /// Copy the populated groups into a new [`TypedArray`].
    #[must_use]
    pub fn to_owned_array(&self) -> TypedArray {
        self.view().to_owned_array()
    }

    /// Decode the populated elements into a [`Vec`] in lexicographical order.
    ///
    /// # Errors
    /// Returns [`ArrayError::IncompatibleElementType`] if the element type does not hold `T`.
    pub fn to_elements<T: Element>(&self) -> Result<Vec<T>, ArrayError> {
        self.view().to_elements()
    }

    /// Decode the populated elements into an [`ndarray::ArrayD`].
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the element type does not hold `T`.
    #[cfg(feature = "ndarray")]
    pub fn to_ndarray<T: Element>(&self) -> Result<ndarray::ArrayD<T>, ArrayError> {
        self.view().to_ndarray()
    }
}

impl<'b> TargetedView<'b> {
    /// Create a new targeted view writing into `target`.
    ///
    /// A `source_type` tag without an order sigil is big endian.
    ///
    /// # Errors
    /// Returns an [`InterpretationError`] if
    ///  - the source element type is not supported,
    ///  - any of `source_dims` are zero, or
    ///  - the source element type cannot be converted to the element type of `target`.
    pub fn new<'a>(
        source_type: impl Into<ElementTypeSpec<'a>>,
        target: &'b mut TypedArray,
        source_dims: &[usize],
    ) -> Result<Self, InterpretationError> {
        let source_type = source_type.into().resolve_source()?;
        validate_dims(source_dims)?;
        let dest_type = *target.element_type();
        validate_conversion(&source_type, &dest_type)?;
        Ok(Self {
            source_type,
            source_dims: source_dims.to_vec(),
            dest_type,
            dest_shape: target.shape().to_vec(),
            target: RefCell::new(target),
        })
    }

    /// Returns the number of elements of the caller's array.
    #[must_use]
    pub fn capacity(&self) -> usize {
        dims_product(&self.dest_shape)
    }

    /// Release the caller's array.
    pub fn into_inner(self) -> &'b mut TypedArray {
        self.target.into_inner()
    }

    /// Lend the caller's array to an assembly of `num_items` items.
    ///
    /// `num_entries` is unused for fixed size elements.
    ///
    /// # Errors
    /// Returns an [`InterpretationError`] if
    ///  - `num_items` is not a multiple of the product of the destination dimensions ([`InterpretationError::ReshapeMismatch`]),
    ///  - `num_items` exceeds the [capacity](Self::capacity) ([`InterpretationError::CapacityExceeded`]), or
    ///  - the caller's array is lent to an assembly that is still alive ([`InterpretationError::DestinationInUse`]).
    pub fn allocate_destination(
        &self,
        num_items: usize,
        num_entries: usize,
    ) -> Result<TargetedDestination<'_>, InterpretationError> {
        let stop = destination_groups(num_items, self.dest_dims())?;
        let capacity = self.capacity();
        if num_items > capacity {
            return Err(InterpretationError::CapacityExceeded {
                num_items,
                capacity,
            });
        }
        let target = self
            .target
            .try_borrow_mut()
            .map_err(|_| InterpretationError::DestinationInUse)?;
        tracing::debug!(
            num_items,
            num_entries,
            num_groups = stop,
            capacity,
            "lending destination"
        );
        Ok(TargetedDestination {
            target: RefMut::map(target, |target| &mut **target),
            window: 0..self.dest_shape[0],
            stop,
        })
    }

    /// Convert all items of `source` into the flattened destination items `item_start..item_stop`.
    ///
    /// `skip_entries` and `num_entries` are unused for fixed size elements.
    ///
    /// # Errors
    /// Returns an [`InterpretationError`] if the item range does not fit the destination or does not match the number of items in `source`, or the elements cannot be converted.
    pub fn fill(
        &self,
        source: &ArrayView,
        destination: &mut TargetedDestination,
        item_start: usize,
        item_stop: usize,
        skip_entries: usize,
        num_entries: usize,
    ) -> Result<(), InterpretationError> {
        let _ = (skip_entries, num_entries);
        destination.fill(source, item_start, item_stop)
    }

    /// Clip the destination to the groups `start..stop` of its current groups.
    ///
    /// The number of populated groups fixed by [`allocate_destination`](Self::allocate_destination) is retained.
    ///
    /// # Errors
    /// Returns [`InterpretationError::RangeOutOfBounds`] if the range exceeds the destination groups and [strict ranges](crate::config::Config#strict-ranges) are enabled.
    pub fn clip_destination<'d>(
        &self,
        destination: TargetedDestination<'d>,
        start: usize,
        stop: usize,
    ) -> Result<TargetedDestination<'d>, InterpretationError> {
        destination.clip(start, stop)
    }

    /// Finalize an assembly, returning the destination groups trimmed to the number of populated groups.
    #[must_use]
    pub fn finalize<'d>(&self, destination: TargetedDestination<'d>) -> TargetedArray<'d> {
        destination.finish()
    }
}

impl Interpretation for TargetedView<'_> {
    fn source_element_type(&self) -> &ElementType {
        &self.source_type
    }

    fn source_dims(&self) -> &[usize] {
        &self.source_dims
    }

    fn dest_element_type(&self) -> &ElementType {
        &self.dest_type
    }

    fn dest_dims(&self) -> &[usize] {
        &self.dest_shape[1..]
    }
}

impl std::fmt::Display for TargetedView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TargetedView({:?}", self.source_type.to_string())?;
        if !self.source_dims.is_empty() {
            write!(f, ", {}", format_dims(&self.source_dims))?;
        }
        write!(
            f,
            ", <array dtype={:?} shape={}>)",
            self.dest_type.to_string(),
            format_dims(&self.dest_shape)
        )
    }
}
