//! Message-level codec
//!
//! Bundles the signal codecs of one message and applies the multiplex policy.
//! Whole-frame encode builds a fresh buffer, so a failing signal never leaves
//! a half-written frame behind.

use crate::config::{CodecConfig, MultiplexPolicy};
use crate::j1939::{self, J1939Id};
use crate::signal_codec::SignalCodec;
use crate::signals::MessageDefinition;
use crate::types::{CodecError, CodecWarning, DecodedFrame, Result, SignalValue};

/// Codec for all signals of one message
#[derive(Debug, Clone)]
pub struct MessageCodec<'a> {
    message: &'a MessageDefinition,
    signals: Vec<SignalCodec<'a>>,
    warnings: Vec<CodecWarning>,
}

impl<'a> MessageCodec<'a> {
    /// Validate the message and derive every signal codec
    pub fn new(message: &'a MessageDefinition, config: &CodecConfig) -> Result<Self> {
        message.validate(&config.units)?;

        let mut signals = Vec::with_capacity(message.signals.len());
        let mut warnings = Vec::new();

        for signal in &message.signals {
            if signal.is_multiplexed() {
                match config.multiplex_policy {
                    MultiplexPolicy::Reject => {
                        return Err(CodecError::MultiplexedSignal {
                            message: message.name.clone(),
                            signal: signal.name.clone(),
                        });
                    }
                    MultiplexPolicy::Skip => {
                        log::warn!(
                            "Skipping multiplexed signal '{}' in message '{}'",
                            signal.name,
                            message.name
                        );
                        warnings.push(CodecWarning::MultiplexedSignalSkipped {
                            message: message.name.clone(),
                            signal: signal.name.clone(),
                        });
                        continue;
                    }
                }
            }
            signals.push(SignalCodec::new(signal, config)?);
        }

        log::debug!(
            "Built codec for message '{}' (id {:#X}, {} signal(s))",
            message.name,
            message.id,
            signals.len()
        );

        Ok(Self {
            message,
            signals,
            warnings,
        })
    }

    pub fn message(&self) -> &'a MessageDefinition {
        self.message
    }

    pub fn name(&self) -> &str {
        &self.message.name
    }

    /// Signal codecs in message order
    pub fn signals(&self) -> &[SignalCodec<'a>] {
        &self.signals
    }

    /// Conditions recorded while building the codec
    pub fn warnings(&self) -> &[CodecWarning] {
        &self.warnings
    }

    /// Find a signal codec by name
    pub fn signal(&self, name: &str) -> Result<&SignalCodec<'a>> {
        self.signals
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| CodecError::SignalNotFound(name.to_string()))
    }

    /// Zeroed buffer of the message length
    pub fn new_frame(&self) -> Vec<u8> {
        vec![0u8; self.message.size]
    }

    fn check_frame(&self, data: &[u8]) -> Result<()> {
        if data.len() < self.message.size {
            return Err(CodecError::BufferTooShort {
                needed: self.message.size,
                actual: data.len(),
            });
        }
        Ok(())
    }

    /// Pack one signal into an existing frame
    pub fn pack(&self, data: &mut [u8], name: &str, value: &SignalValue) -> Result<()> {
        self.check_frame(data)?;
        self.signal(name)?.pack(data, value)
    }

    /// Pack several signals into an existing frame
    ///
    /// Either every value is written or, on the first failure, none is.
    pub fn pack_all(&self, data: &mut [u8], values: &[(&str, SignalValue)]) -> Result<()> {
        self.check_frame(data)?;
        let mut scratch = data.to_vec();
        for (name, value) in values {
            self.signal(name)?.pack(&mut scratch, value)?;
        }
        data.copy_from_slice(&scratch);
        Ok(())
    }

    /// Encode a new frame from name/value pairs; unset signals stay zero
    pub fn encode(&self, values: &[(&str, SignalValue)]) -> Result<Vec<u8>> {
        let mut frame = self.new_frame();
        self.pack_all(&mut frame, values)?;
        Ok(frame)
    }

    /// Decode every signal of a frame
    pub fn decode(&self, data: &[u8]) -> Result<DecodedFrame> {
        self.check_frame(data)?;
        let signals = self
            .signals
            .iter()
            .map(|s| s.unpack_signal(data))
            .collect::<Result<Vec<_>>>()?;

        Ok(DecodedFrame {
            message_name: self.message.name.clone(),
            signals,
        })
    }

    /// Zero one signal's bits
    pub fn clear_signal(&self, data: &mut [u8], name: &str) -> Result<()> {
        self.check_frame(data)?;
        self.signal(name)?.clear(data)
    }

    /// Static priority bits of the frame identifier
    pub fn priority(&self) -> u8 {
        j1939::priority(self.message.id)
    }

    /// J1939 identifier fields, only for messages tagged J1939
    pub fn j1939(&self) -> Option<J1939Id> {
        self.message.j1939()
    }

    /// PGN, only for messages tagged J1939
    pub fn pgn(&self) -> Option<u32> {
        self.j1939().map(|id| id.pgn())
    }
}
