/// Samples that are either the caller's (borrowed mutably) or ours (boxed)
pub(crate) struct SeaCow<'a, T> {
    inner: MutCow<'a, [T]>,
}

enum MutCow<'a, T: ?Sized> {
    Owned(Box<T>),
    Borrowed(&'a mut T),
}

impl<'a, T> SeaCow<'a, T> {
    #[inline]
    pub fn borrowed(data: &'a mut [T]) -> Self {
        Self {
            inner: MutCow::Borrowed(data),
        }
    }

    #[inline]
    pub fn boxed(data: Box<[T]>) -> Self {
        Self {
            inner: MutCow::Owned(data),
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match &self.inner {
            MutCow::Owned(x) => x,
            MutCow::Borrowed(a) => a,
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.inner {
            MutCow::Owned(x) => x,
            MutCow::Borrowed(a) => a,
        }
    }
}

impl<T: Clone> SeaCow<'_, T> {
    /// Copies borrowed data, so that the result is self-contained
    pub fn into_owned(self) -> SeaCow<'static, T> {
        SeaCow::boxed(match self.inner {
            MutCow::Owned(x) => x,
            MutCow::Borrowed(a) => a.to_vec().into_boxed_slice(),
        })
    }
}

#[test]
fn borrowed_writes_through() {
    let mut data = [1u8, 2, 3];
    {
        let mut cow = SeaCow::borrowed(&mut data[..]);
        cow.as_mut_slice()[1] = 9;
        assert_eq!(&[1, 9, 3], cow.as_slice());
    }
    assert_eq!([1, 9, 3], data);
}

#[test]
fn owned_copy() {
    let mut data = [1u8, 2, 3];
    let mut owned = SeaCow::borrowed(&mut data[..]).into_owned();
    owned.as_mut_slice()[0] = 7;
    assert_eq!(&[7, 2, 3], owned.as_slice());
    assert_eq!([1, 2, 3], data);
}
