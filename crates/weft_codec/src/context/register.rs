use alloc::format;
use alloc::vec::Vec;

use weft_utils::hash::HashMap;

use crate::object::Obj;
use crate::{Error, Result};

fn next_id(count: usize) -> Result<u32> {
    u32::try_from(count).map_err(|_| Error::ObjectIdsExhausted)
}

// -----------------------------------------------------------------------------
// WriteRegister

/// Objects written so far, by identity.
///
/// Holds a handle to every registered object so no address is reused while
/// the stream is being written.
#[derive(Default)]
pub(crate) struct WriteRegister {
    ids: HashMap<*const (), u32>,
    objects: Vec<Obj>,
}

impl WriteRegister {
    #[inline]
    pub fn lookup(&self, obj: &Obj) -> Option<u32> {
        self.ids.get(&obj.addr()).copied()
    }

    /// Gives `obj` the next id. The caller has checked it is not registered.
    pub fn insert(&mut self, obj: &Obj) -> Result<u32> {
        let id = next_id(self.objects.len())?;
        self.ids.insert(obj.addr(), id);
        self.objects.push(obj.clone());
        Ok(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }
}

// -----------------------------------------------------------------------------
// ReadRegister

/// Objects read so far, indexed by id.
#[derive(Default)]
pub(crate) struct ReadRegister {
    objects: Vec<Obj>,
}

impl ReadRegister {
    /// Ids must arrive in sequence, starting at 0.
    pub fn insert(&mut self, id: u32, obj: Obj) -> Result<()> {
        let expected = self.objects.len();
        if usize::try_from(id).ok() != Some(expected) {
            return Err(Error::malformed(format!(
                "object id {id} out of sequence, expected {expected}"
            )));
        }
        self.objects.push(obj);
        Ok(())
    }

    pub fn get(&self, id: u32) -> Result<&Obj> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.objects.get(index))
            .ok_or_else(|| Error::malformed(format!("reference to unknown object {id}")))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }
}
