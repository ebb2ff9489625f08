//! embedded_hal I2C trait implementations for USB4715.
use embedded_hal::i2c::{self, I2c, Operation, SevenBitAddress};

use super::USB4715;
use crate::error::{BusTimeoutCause, InvalidTransaction, NackPhase};
use crate::transport::Transport;
use crate::{Error, I2cTransaction};

impl i2c::Error for Error {
    fn kind(&self) -> i2c::ErrorKind {
        use i2c::NoAcknowledgeSource;
        match self {
            Error::BusNack {
                phase: NackPhase::Address,
                ..
            } => i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Error::BusNack {
                phase: NackPhase::Data,
                ..
            } => i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            Error::BusTimeout {
                cause: BusTimeoutCause::ArbitrationLost,
                ..
            } => i2c::ErrorKind::ArbitrationLoss,
            Error::BusTimeout { .. } => i2c::ErrorKind::Bus,
            _ => i2c::ErrorKind::Other,
        }
    }
}

impl<T: Transport> i2c::ErrorType for USB4715<T> {
    type Error = Error;
}

/// Helper to chunk operations based on type (enum case).
fn same_operation_type(a: &Operation, b: &Operation) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

type MaybeOps<'a, 'b, 'c> = Option<&'a mut &'b mut [Operation<'c>]>;
type WritesReads<'a, 'b, 'c> = (MaybeOps<'a, 'b, 'c>, MaybeOps<'a, 'b, 'c>);

/// Split chunked operations into at most one run of writes followed by at most one
/// run of reads, which is all the bridge can express.
fn try_get_valid_operations<'a, 'b, 'c>(
    ops: &'a mut [&'b mut [Operation<'c>]],
) -> Result<WritesReads<'a, 'b, 'c>, Error> {
    match ops {
        [] => Ok((None, None)),
        // Three or more chunks implies read-before-write.
        [_, _, _, ..] => Err(InvalidTransaction::ReadBeforeWrite.into()),
        [[Operation::Read(_), ..], [Operation::Write(_), ..]] => {
            Err(InvalidTransaction::ReadBeforeWrite.into())
        }
        [
            writes @ [Operation::Write(_), ..],
            reads @ [Operation::Read(_), ..],
        ] => Ok((Some(writes), Some(reads))),
        [reads @ [Operation::Read(_), ..]] => Ok((None, Some(reads))),
        [writes @ [Operation::Write(_), ..]] => Ok((Some(writes), None)),
        // chunk_by never yields empty chunks, and adjacent chunks differ in type.
        _ => unreachable!(),
    }
}

impl<T: Transport> I2c<SevenBitAddress> for USB4715<T> {
    /// Execute the provided operations on the I2C bus.
    ///
    /// <div class="warning">
    ///
    /// The hub's bridge runs one write phase followed by one read phase, so it cannot
    /// fully support the contract of [`I2c::transaction`]. Transactions that place a
    /// read operation before a write will return an error.
    ///
    /// </div>
    ///
    /// Consecutive writes are gathered into one buffer and consecutive reads are
    /// filled from one buffer, then the whole lot runs as a single bridge
    /// transaction, with a repeated START between the write and read phases. The
    /// combined lengths must each fit the 32-byte bridge buffers.
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut chunked: Vec<&mut [Operation<'_>]> =
            operations.chunk_by_mut(same_operation_type).collect();
        let (writes, reads) = try_get_valid_operations(chunked.as_mut_slice())?;

        let mut write_data: Vec<u8> = Vec::new();
        for op in writes.iter().flat_map(|ops| ops.iter()) {
            let Operation::Write(buf) = op else {
                unreachable!("Chunk checks ensure only writes here.")
            };
            write_data.extend_from_slice(buf);
        }
        let read_length: usize = reads
            .iter()
            .flat_map(|ops| ops.iter())
            .map(|op| match op {
                Operation::Read(buf) => buf.len(),
                Operation::Write(_) => 0,
            })
            .sum();

        let our_buffer = self.i2c_transaction(&I2cTransaction::write_read(
            address,
            &write_data,
            read_length,
        ))?;

        // Fill the caller's buffers one at a time from our buffer.
        if let Some(reads) = reads {
            let mut copied_so_far = 0;
            for op in reads.iter_mut() {
                let Operation::Read(their_buffer) = op else {
                    unreachable!("Chunk checks ensure only reads here.");
                };
                let start = copied_so_far;
                let end = start + their_buffer.len();
                their_buffer.copy_from_slice(&our_buffer[start..end]);
                copied_so_far = end;
            }
        }

        Ok(())
    }

    fn read(&mut self, address: SevenBitAddress, read: &mut [u8]) -> Result<(), Self::Error> {
        let data = self.i2c_read(address, read.len())?;
        read.copy_from_slice(&data);
        Ok(())
    }

    fn write(&mut self, address: SevenBitAddress, write: &[u8]) -> Result<(), Self::Error> {
        self.i2c_write(address, write)
    }

    fn write_read(
        &mut self,
        address: SevenBitAddress,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        let data = self.i2c_write_read(address, write, read.len())?;
        read.copy_from_slice(&data);
        Ok(())
    }
}

#[cfg(feature = "async")]
mod eh_async {
    use embedded_hal::i2c::{I2c as BlockingI2c, Operation};
    use embedded_hal_async::i2c::I2c as AsyncI2c;

    use crate::USB4715;
    use crate::transport::Transport;

    impl<T: Transport> AsyncI2c for USB4715<T> {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            BlockingI2c::transaction(self, address, operations)
        }

        async fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
            BlockingI2c::read(self, address, read)
        }

        async fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
            BlockingI2c::write(self, address, write)
        }

        async fn write_read(
            &mut self,
            address: u8,
            write: &[u8],
            read: &mut [u8],
        ) -> Result<(), Self::Error> {
            BlockingI2c::write_read(self, address, write, read)
        }
    }
}
