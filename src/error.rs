// This file is part of wersi-tools.
// Copyright (C) 2017 Jeffrey Sharp
//
// wersi-tools is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published
// by the Free Software Foundation, either version 3 of the License,
// or (at your option) any later version.
//
// wersi-tools is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with wersi-tools.  If not, see <http://www.gnu.org/licenses/>.

use thiserror::Error;

use crate::io::TransportError;
use crate::wersi::error::{ParseError, RequestError};

/// Any failure of a block exchange with the instrument.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be framed.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The port failed to send or receive.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response was not a well-formed block.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
